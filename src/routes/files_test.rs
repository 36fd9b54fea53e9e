use super::*;

fn file(name: &str, file_type: &str, mime: &str, size_bytes: i64) -> FileSpec {
    FileSpec {
        original_name: name.into(),
        file_type: file_type.into(),
        mime_type: mime.into(),
        size_bytes,
    }
}

#[test]
fn validate_presign_upload_accepts_well_formed_body() {
    let body = PresignUploadBody { files: vec![file("a.pdf", "pdf", "application/pdf", 1)] };
    assert!(validate_presign_upload(&body).is_ok());
}

#[test]
fn validate_presign_upload_rejects_empty_file_list() {
    let err = validate_presign_upload(&PresignUploadBody { files: Vec::new() }).unwrap_err();
    let fields = err.field_errors.unwrap();
    assert!(fields.contains_key("files"));
}

#[test]
fn validate_presign_upload_reports_each_bad_field_by_path() {
    let body = PresignUploadBody {
        files: vec![
            file("a.pdf", "pdf", "application/pdf", 1),
            file("", "pdf", "", 0),
            file("c.pdf", "", "application/pdf", -5),
        ],
    };
    let err = validate_presign_upload(&body).unwrap_err();
    assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "invalid request body");

    let fields = err.field_errors.unwrap();
    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec![
            "files.1.mimeType",
            "files.1.originalName",
            "files.1.sizeBytes",
            "files.2.fileType",
            "files.2.sizeBytes",
        ]
    );
}

#[test]
fn list_files_query_reads_type_param() {
    let query: ListFilesQuery = serde_json::from_str(r#"{"type":"pdf"}"#).unwrap();
    assert_eq!(query.file_type.as_deref(), Some("pdf"));
}

#[test]
fn presign_upload_shape_reports_missing_and_mistyped_fields() {
    let body = serde_json::json!({
        "files": [
            { "originalName": "a.pdf", "fileType": "pdf", "mimeType": "application/pdf" },
            { "originalName": 7, "fileType": "pdf", "mimeType": "application/pdf", "sizeBytes": "10" },
            "plan.pdf",
        ]
    });
    let fields = presign_upload_shape_errors(&body);
    assert_eq!(fields["files.0.sizeBytes"], vec!["required"]);
    assert_eq!(fields["files.1.originalName"], vec!["expected string"]);
    assert_eq!(fields["files.1.sizeBytes"], vec!["expected integer"]);
    assert_eq!(fields["files.2"], vec!["expected object"]);
    assert_eq!(fields.len(), 4);
}

#[test]
fn presign_upload_shape_requires_files_array() {
    assert_eq!(presign_upload_shape_errors(&serde_json::json!({}))["files"], vec!["required"]);
    assert_eq!(
        presign_upload_shape_errors(&serde_json::json!({ "files": {} }))["files"],
        vec!["expected array"]
    );
    assert_eq!(presign_upload_shape_errors(&serde_json::json!([]))["body"], vec!["expected object"]);
}

#[test]
fn presign_upload_shape_accepts_well_typed_body_with_bad_values() {
    // Empty strings and zero sizes are value problems, reported later.
    let body = serde_json::json!({
        "files": [{ "originalName": "", "fileType": "pdf", "mimeType": "", "sizeBytes": 0 }]
    });
    assert!(presign_upload_shape_errors(&body).is_empty());
}

#[test]
fn presign_download_shape_checks_optional_fields() {
    assert!(presign_download_shape_errors(&serde_json::json!({})).is_empty());
    assert!(presign_download_shape_errors(&serde_json::json!({ "type": null, "fileIds": ["x"] })).is_empty());

    let fields = presign_download_shape_errors(&serde_json::json!({ "type": 3, "fileIds": ["a", 1] }));
    assert_eq!(fields["type"], vec!["expected string"]);
    assert_eq!(fields["fileIds.1"], vec!["expected string"]);

    let fields = presign_download_shape_errors(&serde_json::json!({ "fileIds": "a" }));
    assert_eq!(fields["fileIds"], vec!["expected array"]);
}

#[test]
fn parse_body_returns_field_errors_before_deserializing() {
    let err = parse_body::<PresignUploadBody>(serde_json::json!({ "files": [{}] }), presign_upload_shape_errors)
        .unwrap_err();
    assert_eq!(err.message, "invalid request body");
    let fields = err.field_errors.unwrap();
    assert!(fields.contains_key("files.0.fileType"));

    let body: PresignUploadBody = parse_body(
        serde_json::json!({ "files": [{ "originalName": "a", "fileType": "pdf", "mimeType": "m", "sizeBytes": 3 }] }),
        presign_upload_shape_errors,
    )
    .unwrap();
    assert_eq!(body.files[0].size_bytes, 3);
}
