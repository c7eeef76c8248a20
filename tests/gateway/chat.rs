use formaid::gateway::MAX_BODY_SIZE;
use formaid::prompt::{PAGE_TEXT_BUDGET, TRUNCATION_MARKER};
use reqwest::StatusCode;
use serde_json::{Value, json};

use super::gateway_harness::{GatewayTestServer, mock_gemini, prompt_text, received_bodies};

const CHAT_REPLY: &str = "Choose the Regional Passport Office nearest to your present address.";

fn chat_body(turns: usize) -> Value {
    let history: Vec<Value> = (0..turns)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            json!({"role": role, "content": format!("turn-{i:02}")})
        })
        .collect();

    json!({
        "message": "Which passport office should I pick?",
        "page_context": {
            "title": "Passport Seva - Apply",
            "url": "https://portal.example.gov/apply",
            "form_data": {"Given Name": "Asha", "Passport Office": ""},
            "page_text": "Select the Passport Office closest to your residence."
        },
        "chat_history": history
    })
}

#[tokio::test]
async fn chat_returns_model_text_and_records_the_exchange() {
    let model = mock_gemini(CHAT_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/chat"))
        .json(&chat_body(2))
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("chat reply should be json");
    assert_eq!(body["response"], json!(CHAT_REPLY));
    assert!(body["timestamp"].as_str().is_some());

    let prompt = prompt_text(&received_bodies(&model).await[0]);
    assert!(prompt.contains("Which passport office should I pick?"));
    assert!(prompt.contains("https://portal.example.gov/apply"));
    assert!(prompt.contains("Asha"));

    let records: Vec<Value> = client
        .get(server.url("/api/chat/history"))
        .send()
        .await
        .expect("chat history request should complete")
        .json()
        .await
        .expect("chat history should be json");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["user_message"], json!("Which passport office should I pick?"));
    assert_eq!(records[0]["model_reply"], json!(CHAT_REPLY));
    assert_eq!(records[0]["page_url"], json!("https://portal.example.gov/apply"));
    assert!(
        records[0]["session_id"]
            .as_str()
            .is_some_and(|id| id.starts_with("form-chat-"))
    );

    let guidance: Vec<Value> = client
        .get(server.url("/api/form-help/history"))
        .send()
        .await
        .expect("history request should complete")
        .json()
        .await
        .expect("history should be json");
    assert!(guidance.is_empty());

    server.stop().await;
}

#[tokio::test]
async fn chat_prompt_keeps_only_recent_turns() {
    let model = mock_gemini(CHAT_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&chat_body(14))
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let prompt = prompt_text(&received_bodies(&model).await[0]);
    assert!(!prompt.contains("turn-03"));
    assert!(prompt.contains("turn-04"));
    assert!(prompt.contains("turn-13"));

    server.stop().await;
}

#[tokio::test]
async fn chat_without_api_key_is_a_server_error() {
    let server = GatewayTestServer::start(None).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&chat_body(0))
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    server.stop().await;
}

#[tokio::test]
async fn long_page_text_is_truncated_not_rejected() {
    let model = mock_gemini(CHAT_REPLY).await;
    let server = GatewayTestServer::start(Some(&model)).await;

    let page_text = "पासपोर्ट ".repeat(3000);
    assert!(page_text.len() > MAX_BODY_SIZE);
    let mut body = chat_body(0);
    body["page_context"]["page_text"] = json!(page_text);

    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&body)
        .send()
        .await
        .expect("chat request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let kept: String = page_text.chars().take(PAGE_TEXT_BUDGET).collect();
    let one_more: String = page_text.chars().take(PAGE_TEXT_BUDGET + 1).collect();
    let prompt = prompt_text(&received_bodies(&model).await[0]);
    assert!(prompt.contains(&format!("{kept}{TRUNCATION_MARKER}")));
    assert!(!prompt.contains(&one_more));

    server.stop().await;
}
