use crate::guidance::types::GuidanceResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One completed field-guidance request, success or fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: String,
    pub session_id: String,
    pub field_label: String,
    pub result: GuidanceResult,
    pub timestamp: DateTime<Utc>,
}

impl InteractionRecord {
    pub fn new(session_id: impl Into<String>, result: GuidanceResult) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            field_label: result.field_label.clone(),
            result,
            timestamp: Utc::now(),
        }
    }
}

/// One conversational exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub id: String,
    pub session_id: String,
    pub page_url: String,
    pub user_message: String,
    /// Model reply exactly as received.
    pub model_reply: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatRecord {
    pub fn new(
        session_id: impl Into<String>,
        page_url: impl Into<String>,
        user_message: impl Into<String>,
        model_reply: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            page_url: page_url.into(),
            user_message: user_message.into(),
            model_reply: model_reply.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name: client_name.into(),
            timestamp: Utc::now(),
        }
    }
}
