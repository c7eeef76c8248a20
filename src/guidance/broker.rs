//! Field guidance and page-aware chat, end to end.
//!
//! compose -> invoke -> normalize -> reconcile (or fall back) -> record.
//! Model failures propagate to the caller; only unparseable replies are
//! replaced by the fallback result.

use super::normalize::normalize;
use super::reconcile::{fallback, reconcile};
use super::types::{ChatReply, ChatRequest, FieldQuery, GuidanceResult};
use crate::error::Result;
use crate::history::{ChatRecord, HistoryStore, InteractionRecord};
use crate::llm::ModelInvoker;
use crate::prompt::PromptComposer;
use crate::utils::text::truncate_with_ellipsis;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Characters of an unparseable reply kept in the warning log.
const RAW_PREVIEW_CHARS: usize = 200;

pub fn new_session_id() -> String {
    format!("form-helper-{}", Uuid::new_v4())
}

pub fn new_chat_session_id() -> String {
    format!("form-chat-{}", Uuid::new_v4())
}

pub struct GuidanceBroker {
    composer: PromptComposer,
    invoker: Arc<dyn ModelInvoker>,
    history: Arc<dyn HistoryStore>,
}

impl GuidanceBroker {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        history: Arc<dyn HistoryStore>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            composer: PromptComposer::new()?,
            invoker,
            history,
        })
    }

    pub fn invoker(&self) -> &dyn ModelInvoker {
        self.invoker.as_ref()
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Guidance for one form field.
    pub async fn field_guidance(&self, query: &FieldQuery) -> Result<GuidanceResult> {
        let session_id = new_session_id();
        let prompt = self.composer.guidance(query)?;

        let raw = self
            .invoker
            .invoke(&prompt.system, &prompt.user, &session_id)
            .await?;

        let result = match normalize(&raw) {
            Ok(parsed) => reconcile(&parsed, query),
            Err(err) => {
                tracing::warn!(
                    session_id = %session_id,
                    field_label = %query.field_label,
                    error = %err.message,
                    raw_preview = %truncate_with_ellipsis(&err.raw, RAW_PREVIEW_CHARS),
                    "model reply is not valid JSON, using fallback guidance"
                );
                fallback(query)
            }
        };

        let record = InteractionRecord::new(session_id, result.clone());
        if let Err(err) = self.history.record(&record).await {
            tracing::warn!(
                session_id = %record.session_id,
                error = %err,
                "failed to record interaction"
            );
        }

        Ok(result)
    }

    /// Page-aware conversational reply. The model text is returned as-is.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let session_id = new_chat_session_id();
        let prompt = self.composer.chat(request)?;

        let response = self
            .invoker
            .invoke(&prompt.system, &prompt.user, &session_id)
            .await?;

        let record = ChatRecord::new(
            session_id,
            request.page_context.url.clone(),
            request.message.clone(),
            response.clone(),
        );
        if let Err(err) = self.history.record_chat(&record).await {
            tracing::warn!(
                session_id = %record.session_id,
                error = %err,
                "failed to record chat exchange"
            );
        }

        Ok(ChatReply {
            response,
            timestamp: Utc::now(),
        })
    }

    pub async fn recent_history(&self, limit: usize) -> Result<Vec<InteractionRecord>> {
        Ok(self.history.recent(limit).await?)
    }

    pub async fn recent_chats(&self, limit: usize) -> Result<Vec<ChatRecord>> {
        Ok(self.history.recent_chats(limit).await?)
    }
}
