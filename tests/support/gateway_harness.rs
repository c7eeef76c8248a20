#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use formaid::Config;
use formaid::gateway::run_gateway_with_listener;
use reqwest::StatusCode;
use serde_json::Value;
use tempfile::TempDir;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

pub struct GatewayTestServer {
    pub port: u16,
    pub workspace: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<anyhow::Result<()>>>,
}

impl GatewayTestServer {
    /// Start a gateway whose model provider is the given mock Gemini endpoint.
    pub async fn start(model: Option<&MockServer>) -> Self {
        Self::start_with(model, |_| {}).await
    }

    pub async fn start_with(model: Option<&MockServer>, tweak: impl FnOnce(&mut Config)) -> Self {
        let workspace = TempDir::new().expect("temp workspace should be created");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let mut config = Config::in_dir(workspace.path());
        config.llm.provider = "gemini".to_string();
        config.llm.model = GEMINI_MODEL.to_string();
        config.llm.timeout_secs = 10;
        if let Some(server) = model {
            config.llm.api_key = Some("test-gemini-key".to_string());
            config.llm.base_url = Some(server.uri());
        } else {
            config.llm.api_key = None;
        }
        tweak(&mut config);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            run_gateway_with_listener(listener, Arc::new(config), async {
                let _ = rx.await;
            })
            .await
        });

        wait_until_gateway_ready(port).await;

        Self {
            port,
            workspace,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let handle = self.handle.take().expect("gateway task should still be running");
        let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("gateway should stop after shutdown signal")
            .expect("gateway task should not panic");
        outcome.expect("gateway should exit cleanly");
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn wait_until_gateway_ready(port: u16) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .expect("reqwest client should be built");

    for _ in 0..100 {
        let health = client
            .get(format!("http://127.0.0.1:{port}/api/health"))
            .send()
            .await;
        if matches!(health, Ok(resp) if resp.status() == StatusCode::OK) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    panic!("gateway did not become ready on port {port}");
}

/// Wrap `text` the way Gemini's `generateContent` returns a single candidate.
pub fn gemini_reply(text: &str) -> Value {
    serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

/// A mock Gemini endpoint that answers every request with `text`.
pub async fn mock_gemini(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/models/{GEMINI_MODEL}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(text)))
        .mount(&server)
        .await;
    server
}

/// A mock Gemini endpoint that fails every request with `status`.
pub async fn failing_gemini(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_json(serde_json::json!({"error": {"message": "backend overloaded"}})),
        )
        .mount(&server)
        .await;
    server
}

/// Every request body the mock received, parsed as JSON.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|req| serde_json::from_slice(&req.body).ok())
        .collect()
}

/// Concatenated prompt text from one Gemini request body.
pub fn prompt_text(body: &Value) -> String {
    let mut out = String::new();
    if let Some(parts) = body["systemInstruction"]["parts"].as_array() {
        for part in parts {
            out.push_str(part["text"].as_str().unwrap_or_default());
            out.push('\n');
        }
    }
    if let Some(contents) = body["contents"].as_array() {
        for content in contents {
            for part in content["parts"].as_array().into_iter().flatten() {
                out.push_str(part["text"].as_str().unwrap_or_default());
                out.push('\n');
            }
        }
    }
    out
}
