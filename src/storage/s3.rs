//! S3 backend — AWS Signature Version 4 query-string presigning.
//!
//! DESIGN
//! ======
//! Clients move bytes directly to and from the bucket; this server only
//! signs URLs. Uploads sign `content-type` alongside `host`, so the client
//! must `PUT` with the MIME type it declared. The payload is always
//! `UNSIGNED-PAYLOAD`.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, UtcOffset};

use super::key::{aws_uri_encode, encode_uri_component};
use super::{DownloadRequest, StorageBackend, StorageError, UploadRequest};
use crate::config::StorageMode;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and optional `AWS_SESSION_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `MissingCredentials` if the key id or secret is unset.
    pub fn from_env() -> Result<Self, StorageError> {
        let access_key_id =
            std::env::var("AWS_ACCESS_KEY_ID").map_err(|_| StorageError::MissingCredentials("AWS_ACCESS_KEY_ID"))?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| StorageError::MissingCredentials("AWS_SECRET_ACCESS_KEY"))?;
        let session_token = std::env::var("AWS_SESSION_TOKEN")
            .into_iter()
            .find(|token| !token.is_empty());
        Ok(Self { access_key_id, secret_access_key, session_token })
    }
}

/// A request to presign.
#[derive(Debug, Clone)]
pub struct PresignParams<'a> {
    pub method: &'a str,
    pub host: &'a str,
    /// Object key, unencoded, without the leading slash.
    pub key: &'a str,
    /// Extra query parameters (e.g. `response-content-disposition`), unencoded.
    pub extra_query: Vec<(String, String)>,
    /// Signed `content-type` header value, if the request must carry one.
    pub content_type: Option<&'a str>,
    pub region: &'a str,
    pub expires_seconds: u64,
    pub now: OffsetDateTime,
}

/// Produce a presigned `https://` URL.
///
/// # Errors
///
/// Returns `Signing` if the HMAC cannot be keyed.
pub fn presign(params: &PresignParams<'_>, credentials: &AwsCredentials) -> Result<String, StorageError> {
    let now = params.now.to_offset(UtcOffset::UTC);
    let amz_date = format_amz_date(now);
    let date_stamp = &amz_date[..8];
    let scope = format!("{date_stamp}/{}/{SERVICE}/aws4_request", params.region);

    // Canonical headers are sorted by lowercase name.
    let (canonical_headers, signed_headers) = match params.content_type {
        Some(content_type) => (
            format!("content-type:{}\nhost:{}\n", content_type.trim(), params.host),
            "content-type;host",
        ),
        None => (format!("host:{}\n", params.host), "host"),
    };

    let mut query: Vec<(String, String)> = vec![
        ("X-Amz-Algorithm".into(), ALGORITHM.into()),
        ("X-Amz-Credential".into(), format!("{}/{scope}", credentials.access_key_id)),
        ("X-Amz-Date".into(), amz_date.clone()),
        ("X-Amz-Expires".into(), params.expires_seconds.to_string()),
        ("X-Amz-SignedHeaders".into(), signed_headers.into()),
    ];
    if let Some(token) = &credentials.session_token {
        query.push(("X-Amz-Security-Token".into(), token.clone()));
    }
    query.extend(params.extra_query.iter().cloned());

    let canonical_query = canonical_query_string(&query);
    let canonical_uri = format!("/{}", aws_uri_encode(params.key, true));
    let canonical_request = format!(
        "{}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{UNSIGNED_PAYLOAD}",
        params.method
    );

    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    );

    let signing_key = signing_key(&credentials.secret_access_key, date_stamp, params.region)?;
    let signature = hex::encode(hmac(&signing_key, string_to_sign.as_bytes())?);

    Ok(format!(
        "https://{}{canonical_uri}?{canonical_query}&X-Amz-Signature={signature}",
        params.host
    ))
}

fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (aws_uri_encode(k, false), aws_uri_encode(v, false)))
        .collect();
    encoded.sort();
    encoded
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn signing_key(secret: &str, date_stamp: &str, region: &str) -> Result<Vec<u8>, StorageError> {
    let k_date = hmac(format!("AWS4{secret}").as_bytes(), date_stamp.as_bytes())?;
    let k_region = hmac(&k_date, region.as_bytes())?;
    let k_service = hmac(&k_region, SERVICE.as_bytes())?;
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Result<Vec<u8>, StorageError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| StorageError::Signing)?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// `YYYYMMDDTHHMMSSZ`.
pub(crate) fn format_amz_date(at: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Presigns against `https://<bucket>.s3.<region>.amazonaws.com`.
#[derive(Debug, Clone)]
pub struct S3Storage {
    region: String,
    bucket: String,
    credentials: AwsCredentials,
    expires_seconds: u64,
}

impl S3Storage {
    #[must_use]
    pub fn new(region: String, bucket: String, credentials: AwsCredentials, expires_seconds: u64) -> Self {
        Self { region, bucket, credentials, expires_seconds }
    }

    fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }

    fn sign(
        &self,
        method: &str,
        key: &str,
        extra_query: Vec<(String, String)>,
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        let host = self.host();
        presign(
            &PresignParams {
                method,
                host: &host,
                key,
                extra_query,
                content_type,
                region: &self.region,
                expires_seconds: self.expires_seconds,
                now: OffsetDateTime::now_utc(),
            },
            &self.credentials,
        )
    }
}

impl StorageBackend for S3Storage {
    fn mode(&self) -> StorageMode {
        StorageMode::Aws
    }

    fn upload_url(&self, req: &UploadRequest<'_>) -> Result<String, StorageError> {
        self.sign("PUT", req.storage_key, Vec::new(), Some(req.mime_type))
    }

    fn download_url(&self, req: &DownloadRequest<'_>) -> Result<String, StorageError> {
        let disposition = format!("attachment; filename=\"{}\"", encode_uri_component(req.original_name));
        self.sign("GET", req.storage_key, vec![("response-content-disposition".into(), disposition)], None)
    }
}

#[cfg(test)]
#[path = "s3_test.rs"]
mod tests;
