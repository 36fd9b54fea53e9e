use super::*;

#[test]
fn guess_file_type_uses_lowercase_extension() {
    assert_eq!(guess_file_type("Site Plan.PDF"), "pdf");
    assert_eq!(guess_file_type("archive.tar.gz"), "gz");
    assert_eq!(guess_file_type(".bashrc"), "bashrc");
}

#[test]
fn guess_file_type_defaults_to_bin() {
    assert_eq!(guess_file_type("README"), "bin");
    assert_eq!(guess_file_type("trailing."), "bin");
}

#[test]
fn guess_mime_type_falls_back_to_octet_stream() {
    assert_eq!(guess_mime_type("pdf"), "application/pdf");
    assert_eq!(guess_mime_type("jpeg"), "image/jpeg");
    assert_eq!(guess_mime_type("bin"), "application/octet-stream");
    assert_eq!(guess_mime_type("ifc"), "application/octet-stream");
}

#[test]
fn describe_file_fills_upload_metadata() {
    let file = describe_file(Path::new("plans/Level 1.png"), 2048).unwrap();
    assert_eq!(file.original_name, "Level 1.png");
    assert_eq!(file.file_type, "png");
    assert_eq!(file.mime_type, "image/png");
    assert_eq!(file.size_bytes, 2048);
}

#[test]
fn describe_file_rejects_paths_without_file_name() {
    assert!(matches!(describe_file(Path::new(".."), 0), Err(CliError::InvalidFileName(_))));
}

#[test]
fn resolve_url_keeps_absolute_urls() {
    let s3 = "https://bucket.s3.us-east-1.amazonaws.com/k?X-Amz-Signature=abc";
    assert_eq!(resolve_url("http://localhost:3000", s3), s3);
    assert_eq!(resolve_url("http://localhost:3000", "HTTP://other/x"), "HTTP://other/x");
}

#[test]
fn resolve_url_joins_relative_urls() {
    assert_eq!(
        resolve_url("http://localhost:3000/", "/projects/p/files/f/upload"),
        "http://localhost:3000/projects/p/files/f/upload"
    );
}

#[test]
fn download_file_name_strips_directories() {
    let id = Uuid::nil();
    assert_eq!(download_file_name("plan.pdf", id), "plan.pdf");
    assert_eq!(download_file_name("../../etc/passwd", id), "passwd");
    assert_eq!(download_file_name("..", id), id.to_string());
}

#[test]
fn cli_parses_files_download_by_id() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from([
        "planroom-cli",
        "files",
        "download",
        &Uuid::nil().to_string(),
        "--id",
        &id.to_string(),
        "--out",
        "/tmp/out",
    ])
    .unwrap();
    let Command::Files(FilesCommand { command: FilesSubcommand::Download { ids, file_type, out, .. } }) = cli.command
    else {
        panic!("expected files download");
    };
    assert_eq!(ids, vec![id]);
    assert!(file_type.is_none());
    assert_eq!(out, PathBuf::from("/tmp/out"));
}

#[test]
fn cli_download_requires_type_or_id() {
    let result = Cli::try_parse_from(["planroom-cli", "files", "download", &Uuid::nil().to_string()]);
    assert!(result.is_err());
}

#[test]
fn cli_parses_project_create() {
    let cli = Cli::try_parse_from(["planroom-cli", "--base-url", "http://x", "project", "create", "--name", "A"]).unwrap();
    assert_eq!(cli.base_url, "http://x");
    assert!(matches!(
        cli.command,
        Command::Project(ProjectCommand { command: ProjectSubcommand::Create { ref name } }) if name == "A"
    ));
}

#[test]
fn presign_responses_deserialize_from_server_shape() {
    let up: PresignUploadResponse = serde_json::from_value(serde_json::json!({
        "expiresInSeconds": 600,
        "items": [{ "fileId": Uuid::nil(), "storageKey": "k", "uploadUrl": "/u", "mode": "local" }]
    }))
    .unwrap();
    assert_eq!(up.items[0].upload_url, "/u");

    let down: PresignDownloadResponse = serde_json::from_value(serde_json::json!({
        "expiresInSeconds": 600,
        "items": [{ "fileId": Uuid::nil(), "originalName": "a.pdf", "fileType": "pdf", "downloadUrl": "/d", "mode": "local" }]
    }))
    .unwrap();
    assert_eq!(down.items[0].original_name, "a.pdf");
    assert_eq!(down.items[0].file_id, Uuid::nil());
}

fn test_context() -> CliContext {
    CliContext { base_url: "http://localhost:3000".into(), client: reqwest::Client::new() }
}

#[test]
fn build_request_encodes_query_values() {
    let request =
        build_request(&test_context(), reqwest::Method::GET, "/projects/p/files", &[("type", "c++ & #1")], None)
            .unwrap();
    assert_eq!(request.url().as_str(), "http://localhost:3000/projects/p/files?type=c%2B%2B+%26+%231");
}

#[test]
fn build_request_without_query_has_no_question_mark() {
    let request = build_request(&test_context(), reqwest::Method::GET, "/health", &[], None).unwrap();
    assert_eq!(request.url().as_str(), "http://localhost:3000/health");
    assert!(request.body().is_none());
}

#[test]
fn build_request_attaches_json_body() {
    let body = serde_json::json!({ "name": "A" });
    let request = build_request(&test_context(), reqwest::Method::POST, "/projects", &[], Some(body)).unwrap();
    assert_eq!(request.headers()[reqwest::header::CONTENT_TYPE], "application/json");
    assert_eq!(request.body().and_then(reqwest::Body::as_bytes), Some(&br#"{"name":"A"}"#[..]));
}

#[test]
fn parse_response_body_reads_empty_as_null() {
    assert_eq!(parse_response_body("").unwrap(), Value::Null);
    assert_eq!(parse_response_body("  \n").unwrap(), Value::Null);
    assert_eq!(parse_response_body(r#"{"ok":true}"#).unwrap(), serde_json::json!({ "ok": true }));
}

#[test]
fn parse_response_body_reports_invalid_json() {
    assert!(matches!(parse_response_body("<html>oops</html>"), Err(CliError::InvalidJson(_))));
}
