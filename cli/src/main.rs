use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{method} {url} returned HTTP {status}: {message}")]
    ServerError { method: reqwest::Method, url: String, status: u16, message: String },
    #[error("io error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not a file name: {0}")]
    InvalidFileName(PathBuf),
    #[error("server presigned {got} uploads for {expected} files")]
    PresignMismatch { expected: usize, got: usize },
}

#[derive(Parser, Debug)]
#[command(name = "planroom-cli", about = "Planroom project and file CLI")]
struct Cli {
    #[arg(long, env = "PLANROOM_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone)]
struct CliContext {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Health,
    Project(ProjectCommand),
    Files(FilesCommand),
}

#[derive(Args, Debug)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectSubcommand {
    Create {
        #[arg(long)]
        name: String,
    },
}

#[derive(Args, Debug)]
struct FilesCommand {
    #[command(subcommand)]
    command: FilesSubcommand,
}

#[derive(Subcommand, Debug)]
enum FilesSubcommand {
    /// List file records, newest first.
    List {
        project_id: Uuid,
        #[arg(long = "type")]
        file_type: Option<String>,
    },
    /// Presign and upload local files.
    Upload {
        project_id: Uuid,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Presign downloads by type or id and save them.
    Download {
        project_id: Uuid,
        #[arg(long = "type", required_unless_present = "ids")]
        file_type: Option<String>,
        #[arg(long = "id")]
        ids: Vec<Uuid>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignUploadItem {
    file_id: Uuid,
    upload_url: String,
}

#[derive(Debug, Deserialize)]
struct PresignUploadResponse {
    items: Vec<PresignUploadItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignDownloadItem {
    file_id: Uuid,
    original_name: String,
    download_url: String,
}

#[derive(Debug, Deserialize)]
struct PresignDownloadResponse {
    items: Vec<PresignDownloadItem>,
}

/// Upload metadata for one local file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LocalFile {
    path: PathBuf,
    original_name: String,
    file_type: String,
    mime_type: &'static str,
    size_bytes: u64,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext { base_url: cli.base_url.trim_end_matches('/').to_owned(), client: reqwest::Client::new() };

    match cli.command {
        Command::Health => run_health(&ctx).await,
        Command::Project(project) => run_project(&ctx, project).await,
        Command::Files(files) => run_files(&ctx, files).await,
    }
}

async fn run_health(cli: &CliContext) -> Result<(), CliError> {
    let json = api_request(cli, reqwest::Method::GET, "/health", None).await?;
    print_json(&json)
}

async fn run_project(cli: &CliContext, project: ProjectCommand) -> Result<(), CliError> {
    match project.command {
        ProjectSubcommand::Create { name } => {
            let json =
                api_request(cli, reqwest::Method::POST, "/projects", Some(serde_json::json!({ "name": name }))).await?;
            print_json(&json)
        }
    }
}

async fn run_files(cli: &CliContext, files: FilesCommand) -> Result<(), CliError> {
    match files.command {
        FilesSubcommand::List { project_id, file_type } => {
            let path = format!("/projects/{project_id}/files");
            let query: Vec<(&str, &str)> =
                file_type.as_deref().filter(|t| !t.is_empty()).map(|t| ("type", t)).into_iter().collect();
            let json = api_request_with_query(cli, reqwest::Method::GET, &path, &query, None).await?;
            print_json(&json)
        }
        FilesSubcommand::Upload { project_id, paths } => upload_files(cli, project_id, &paths).await,
        FilesSubcommand::Download { project_id, file_type, ids, out } => {
            download_files(cli, project_id, file_type, ids, &out).await
        }
    }
}

async fn upload_files(cli: &CliContext, project_id: Uuid, paths: &[PathBuf]) -> Result<(), CliError> {
    let mut local_files = Vec::with_capacity(paths.len());
    for path in paths {
        let meta = tokio::fs::metadata(path).await.map_err(|source| CliError::Io { path: path.clone(), source })?;
        local_files.push(describe_file(path, meta.len())?);
    }

    let body = serde_json::json!({
        "files": local_files
            .iter()
            .map(|f| serde_json::json!({
                "originalName": f.original_name,
                "fileType": f.file_type,
                "mimeType": f.mime_type,
                "sizeBytes": f.size_bytes,
            }))
            .collect::<Vec<_>>(),
    });
    let path = format!("/projects/{project_id}/files/presign-upload");
    let presigned: PresignUploadResponse =
        serde_json::from_value(api_request(cli, reqwest::Method::POST, &path, Some(body)).await?)?;

    if presigned.items.len() != local_files.len() {
        return Err(CliError::PresignMismatch { expected: local_files.len(), got: presigned.items.len() });
    }

    // Items come back in request order.
    for (item, file) in presigned.items.iter().zip(&local_files) {
        let bytes = tokio::fs::read(&file.path).await.map_err(|source| CliError::Io { path: file.path.clone(), source })?;
        let url = resolve_url(&cli.base_url, &item.upload_url);
        let response = cli
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, file.mime_type)
            .body(bytes)
            .send()
            .await?;
        check_status(reqwest::Method::PUT, &url, response).await?;
        eprintln!("uploaded {} as {}", file.path.display(), item.file_id);
    }

    println!("uploaded {}", presigned.items.len());
    Ok(())
}

async fn download_files(
    cli: &CliContext,
    project_id: Uuid,
    file_type: Option<String>,
    ids: Vec<Uuid>,
    out: &Path,
) -> Result<(), CliError> {
    let mut body = serde_json::Map::new();
    if let Some(file_type) = file_type {
        body.insert("type".into(), Value::String(file_type));
    }
    if !ids.is_empty() {
        body.insert("fileIds".into(), serde_json::to_value(&ids)?);
    }

    let path = format!("/projects/{project_id}/files/presign-download");
    let presigned: PresignDownloadResponse =
        serde_json::from_value(api_request(cli, reqwest::Method::POST, &path, Some(Value::Object(body))).await?)?;

    tokio::fs::create_dir_all(out)
        .await
        .map_err(|source| CliError::Io { path: out.to_owned(), source })?;

    for item in &presigned.items {
        let url = resolve_url(&cli.base_url, &item.download_url);
        let response = cli.client.get(&url).send().await?;
        let response = check_status(reqwest::Method::GET, &url, response).await?;
        let bytes = response.bytes().await?;

        let target = out.join(download_file_name(&item.original_name, item.file_id));
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|source| CliError::Io { path: target.clone(), source })?;
        eprintln!("saved {}", target.display());
    }

    println!("downloaded {}", presigned.items.len());
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

/// Extension of `name`, lowercased; `bin` when there is none.
fn guess_file_type(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => "bin".to_owned(),
    }
}

fn guess_mime_type(file_type: &str) -> &'static str {
    match file_type {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "dwg" => "image/vnd.dwg",
        "dxf" => "image/vnd.dxf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

fn describe_file(path: &Path, size_bytes: u64) -> Result<LocalFile, CliError> {
    let original_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::InvalidFileName(path.to_owned()))?;
    let file_type = guess_file_type(&original_name);
    let mime_type = guess_mime_type(&file_type);
    Ok(LocalFile { path: path.to_owned(), original_name, file_type, mime_type, size_bytes })
}

/// Absolute URLs are used as-is; server-relative ones are joined to the base URL.
fn resolve_url(base_url: &str, url: &str) -> String {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_owned()
    } else {
        format!("{}{url}", base_url.trim_end_matches('/'))
    }
}

/// Last path component of the stored name, so a download never writes outside `--out`.
fn download_file_name(original_name: &str, file_id: Uuid) -> String {
    Path::new(original_name)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| file_id.to_string())
}

async fn check_status(
    method: reqwest::Method,
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CliError::ServerError { method, url: url.to_owned(), status: status.as_u16(), message })
}

async fn api_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    body: Option<Value>,
) -> Result<Value, CliError> {
    api_request_with_query(cli, method, path, &[], body).await
}

async fn api_request_with_query(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    query: &[(&str, &str)],
    body: Option<Value>,
) -> Result<Value, CliError> {
    let request = build_request(cli, method.clone(), path, query, body)?;
    let url = request.url().to_string();

    let response = check_status(method, &url, cli.client.execute(request).await?).await?;
    parse_response_body(&response.text().await?)
}

/// Query values are percent-encoded, so types like `c++` survive the trip.
fn build_request(
    cli: &CliContext,
    method: reqwest::Method,
    path: &str,
    query: &[(&str, &str)],
    body: Option<Value>,
) -> Result<reqwest::Request, CliError> {
    let url = format!("{}{}", cli.base_url, path);
    let mut request = cli.client.request(method, &url);
    if !query.is_empty() {
        request = request.query(query);
    }
    if let Some(json) = body {
        request = request.json(&json);
    }
    Ok(request.build()?)
}

/// Empty bodies read as `null`; anything else must be valid JSON.
fn parse_response_body(text: &str) -> Result<Value, CliError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(text)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
