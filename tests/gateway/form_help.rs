use reqwest::StatusCode;
use serde_json::{Value, json};

use super::gateway_harness::{
    GatewayTestServer, failing_gemini, mock_gemini, prompt_text, received_bodies,
};

const GIVEN_NAME_REPLY: &str = r#"```json
{
  "needs_interaction": false,
  "clarification_question": null,
  "question_options": [],
  "advice": "Enter your first name exactly as it appears on your proof of identity.",
  "warning": "Do not include your surname or initials here.",
  "recommended_value": null
}
```"#;

const ECR_REPLY: &str = r#"{
  "needs_interaction": true,
  "clarification_question": "Have you passed class 10 (matriculation) or higher?",
  "question_options": [
    {"label": "Yes, class 10 or higher", "value": "ECNR", "recommendation": "Select ECNR"},
    {"label": "No, below class 10", "value": "ECR", "recommendation": "Select ECR"}
  ],
  "advice": "Your emigration check status depends on your education.",
  "warning": "Choosing the wrong status can delay travel abroad."
}"#;

async fn post_form_help(server: &GatewayTestServer, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(server.url("/api/form-help"))
        .json(&body)
        .send()
        .await
        .expect("form-help request should complete")
}

#[tokio::test]
async fn plain_text_field_returns_direct_guidance() {
    let model = mock_gemini(GIVEN_NAME_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = post_form_help(
        &server,
        json!({"field_label": "Given Name", "field_type": "input"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("guidance should be json");
    assert_eq!(body["needs_interaction"], json!(false));
    assert_eq!(body["field_label"], json!("Given Name"));
    assert_eq!(body["question_options"], json!([]));
    assert!(body["advice"].as_str().is_some_and(|s| s.contains("first name")));
    assert!(body["warning"].as_str().is_some_and(|s| !s.is_empty()));

    let bodies = received_bodies(&model).await;
    assert_eq!(bodies.len(), 1);
    let prompt = prompt_text(&bodies[0]);
    assert!(prompt.contains("\"Given Name\""));
    assert!(prompt.contains("needs_interaction"));

    server.stop().await;
}

#[tokio::test]
async fn eligibility_select_asks_a_clarifying_question() {
    let model = mock_gemini(ECR_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = post_form_help(
        &server,
        json!({
            "field_label": "ECR / ECNR Status",
            "field_type": "select",
            "field_options": "ECR\nECNR",
            "form_context": "Indian Passport Application Form"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("guidance should be json");
    assert_eq!(body["needs_interaction"], json!(true));
    assert_eq!(body["field_label"], json!("ECR / ECNR Status"));
    assert!(body["clarification_question"].as_str().is_some());

    let options = body["question_options"]
        .as_array()
        .expect("question_options should be an array");
    assert!(options.len() >= 2);
    for option in options {
        assert!(option["label"].as_str().is_some_and(|s| !s.is_empty()));
        assert!(option["value"].as_str().is_some_and(|s| !s.is_empty()));
    }

    let prompt = prompt_text(&received_bodies(&model).await[0]);
    assert!(prompt.contains("Indian Passport Application Form"));
    assert!(prompt.contains("ECNR"));

    server.stop().await;
}

#[tokio::test]
async fn truncated_model_json_yields_fallback_not_error() {
    let model = mock_gemini(r#"{"advice": "x""#).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = post_form_help(
        &server,
        json!({"field_label": "Date of Birth", "field_type": "input"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("fallback should be json");
    assert_eq!(body["needs_interaction"], json!(false));
    assert_eq!(body["field_label"], json!("Date of Birth"));
    assert_eq!(
        body["advice"],
        json!("Enter the required information accurately.")
    );
    assert_eq!(
        body["warning"],
        json!("Double-check for any typos before submitting.")
    );
    assert_eq!(body["question_options"], json!([]));

    server.stop().await;
}

#[tokio::test]
async fn empty_model_reply_yields_fallback_not_error() {
    let model = mock_gemini("").await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = post_form_help(&server, json!({"field_label": "Given Name"})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("fallback should be json");
    assert_eq!(body["needs_interaction"], json!(false));
    assert_eq!(body["field_label"], json!("Given Name"));
    assert_eq!(
        body["advice"],
        json!("Enter the required information accurately.")
    );
    assert_eq!(
        body["warning"],
        json!("Double-check for any typos before submitting.")
    );

    server.stop().await;
}

#[tokio::test]
async fn history_lists_newest_first_and_honors_limit() {
    let model = mock_gemini(GIVEN_NAME_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    for label in ["Given Name", "Surname", "Place of Birth"] {
        let response = post_form_help(&server, json!({"field_label": label})).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let client = reqwest::Client::new();
    let records: Vec<Value> = client
        .get(server.url("/api/form-help/history?limit=2"))
        .send()
        .await
        .expect("history request should complete")
        .json()
        .await
        .expect("history should be json");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["field_label"], json!("Place of Birth"));
    assert_eq!(records[1]["field_label"], json!("Surname"));
    for record in &records {
        assert!(
            record["session_id"]
                .as_str()
                .is_some_and(|id| id.starts_with("form-helper-"))
        );
    }

    let all: Vec<Value> = client
        .get(server.url("/api/form-help/history"))
        .send()
        .await
        .expect("history request should complete")
        .json()
        .await
        .expect("history should be json");
    assert_eq!(all.len(), 3);

    server.stop().await;
}

#[tokio::test]
async fn history_survives_gateway_restart() {
    let model = mock_gemini(GIVEN_NAME_REPLY).await;
    let shared = tempfile::TempDir::new().expect("shared history dir should be created");
    let db_path = shared.path().join("shared-history.db");

    let first_db = db_path.clone();
    let server = GatewayTestServer::start_with(Some(&model), move |config| {
        config.history.database_path = Some(first_db);
    })
    .await;
    let response = post_form_help(&server, json!({"field_label": "Given Name"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    server.stop().await;
    assert!(db_path.exists());

    let second_db = db_path.clone();
    let restarted = GatewayTestServer::start_with(Some(&model), move |config| {
        config.history.database_path = Some(second_db);
    })
    .await;

    let records: Vec<Value> = reqwest::Client::new()
        .get(restarted.url("/api/form-help/history"))
        .send()
        .await
        .expect("history request should complete")
        .json()
        .await
        .expect("history should be json");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["field_label"], json!("Given Name"));

    restarted.stop().await;
}

#[tokio::test]
async fn missing_api_key_is_a_server_error() {
    let server = GatewayTestServer::start(None).await;

    let response = post_form_help(&server, json!({"field_label": "Given Name"})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("error should be json");
    assert!(body["error"].as_str().is_some_and(|msg| msg.contains("not configured")));

    let records: Vec<Value> = reqwest::Client::new()
        .get(server.url("/api/form-help/history"))
        .send()
        .await
        .expect("history request should complete")
        .json()
        .await
        .expect("history should be json");
    assert!(records.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn provider_failure_is_a_server_error_without_upstream_detail() {
    let model = failing_gemini(503).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = post_form_help(&server, json!({"field_label": "Given Name"})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await.expect("error should be json");
    let message = body["error"].as_str().unwrap_or_default();
    assert!(!message.contains("test-gemini-key"));
    assert!(!message.contains("overloaded"));

    server.stop().await;
}

#[tokio::test]
async fn malformed_request_body_is_rejected() {
    let model = mock_gemini(GIVEN_NAME_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/form-help"))
        .header("content-type", "application/json")
        .body(r#"{"field_type": "input"}"#)
        .send()
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(received_bodies(&model).await.is_empty());

    server.stop().await;
}
