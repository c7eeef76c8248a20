use reqwest::StatusCode;
use serde_json::{Value, json};

use super::gateway_harness::{GatewayTestServer, mock_gemini};

#[tokio::test]
async fn root_and_health_describe_the_service() {
    let model = mock_gemini("{}").await;
    let server = GatewayTestServer::start(Some(&model)).await;
    let client = reqwest::Client::new();

    for path in ["/api", "/api/"] {
        let body: Value = client
            .get(server.url(path))
            .send()
            .await
            .expect("root request should complete")
            .json()
            .await
            .expect("root should be json");
        assert_eq!(body["message"], json!("Government Form Helper API"));
    }

    let health: Value = client
        .get(server.url("/api/health"))
        .send()
        .await
        .expect("health request should complete")
        .json()
        .await
        .expect("health should be json");
    assert_eq!(health["status"], json!("ok"));
    assert_eq!(health["provider"], json!("gemini"));
    assert_eq!(health["history"], json!("sqlite"));

    server.stop().await;
}

#[tokio::test]
async fn status_checks_round_trip() {
    let model = mock_gemini("{}").await;
    let server = GatewayTestServer::start(Some(&model)).await;
    let client = reqwest::Client::new();

    for name in ["extension-popup", "options-page"] {
        let created: Value = client
            .post(server.url("/api/status"))
            .json(&json!({"client_name": name}))
            .send()
            .await
            .expect("status create should complete")
            .json()
            .await
            .expect("status should be json");
        assert_eq!(created["client_name"], json!(name));
        assert!(created["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    let checks: Vec<Value> = client
        .get(server.url("/api/status"))
        .send()
        .await
        .expect("status list should complete")
        .json()
        .await
        .expect("status list should be json");
    assert_eq!(checks.len(), 2);
    assert_eq!(checks[0]["client_name"], json!("options-page"));

    server.stop().await;
}

#[tokio::test]
async fn extension_download_serves_configured_archive() {
    let model = mock_gemini("{}").await;
    let archive = tempfile::NamedTempFile::new().expect("archive file should be created");
    std::fs::write(archive.path(), b"PK\x03\x04fake-zip").expect("archive should be written");
    let archive_path = archive.path().to_path_buf();

    let server = GatewayTestServer::start_with(Some(&model), move |config| {
        config.extension.archive_path = Some(archive_path);
    })
    .await;

    let response = reqwest::get(server.url("/api/extension/download"))
        .await
        .expect("download should complete");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/zip"
    );
    assert_eq!(
        response.headers()["content-disposition"].to_str().unwrap(),
        "attachment; filename=\"formaid-extension.zip\""
    );
    let bytes = response.bytes().await.expect("archive bytes should arrive");
    assert_eq!(&bytes[..], b"PK\x03\x04fake-zip");

    server.stop().await;
}

#[tokio::test]
async fn extension_download_without_archive_is_not_found() {
    let model = mock_gemini("{}").await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = reqwest::get(server.url("/api/extension/download"))
        .await
        .expect("download should complete");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.stop().await;
}

#[tokio::test]
async fn cors_preflight_allows_any_origin_by_default() {
    let model = mock_gemini("{}").await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, server.url("/api/form-help"))
        .header("origin", "chrome-extension://abcdefghijklmnop")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .expect("preflight should complete");
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"]
            .to_str()
            .unwrap(),
        "*"
    );

    server.stop().await;
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let model = mock_gemini("{}").await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let huge = "x".repeat(70_000);
    let response = reqwest::Client::new()
        .post(server.url("/api/form-help"))
        .json(&json!({"field_label": "Notes", "form_context": huge}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    server.stop().await;
}
