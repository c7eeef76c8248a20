use super::engine::TeraEngine;
use crate::guidance::types::{ChatRequest, ConversationTurn, FieldQuery};
use crate::utils::text::truncate_with_marker;
use serde::Serialize;
use tera::Context;

/// Number of most recent conversation turns shown to the model.
pub const HISTORY_TURN_LIMIT: usize = 10;
/// Character budget for scraped page text in the conversational prompt.
pub const PAGE_TEXT_BUDGET: usize = 8000;
pub const TRUNCATION_MARKER: &str = "\n...[page text truncated]";

const GUIDANCE_SYSTEM_PROMPT: &str = "\
You are an expert consultant for government application forms. You help people fill in \
official web forms field by field with clear, practical guidance.

Respond ONLY with a single JSON object, no Markdown and no surrounding text, with exactly these keys:

- needs_interaction (boolean): whether the correct value depends on the user's personal situation.
- clarification_question (string or null): one short, friendly question that determines the \
correct choice. Required when needs_interaction is true, otherwise null.
- question_options (array): when needs_interaction is true, two or more objects \
{\"label\": string, \"value\": string, \"recommendation\": string} describing the possible \
answers to the question and what to select for each. Empty when needs_interaction is false.
- advice (string): what to enter in this field, at most 30 words.
- warning (string): the single most common mistake to avoid for this field.
- recommended_value (string or null): the value to enter, when it can be stated without knowing more.

Decision rule for needs_interaction:
- true for fields whose correct answer depends on the user's situation: status, eligibility, \
category or classification fields, usually presented as selectable options.
- false for fields with a single objectively correct entry: values copied from an identity \
document, addresses, dates, contact numbers.";

const CHAT_SYSTEM_PROMPT: &str = "\
You are a friendly assistant helping a person complete a government web form. \
Use the page context and the values already entered to answer precisely. \
Keep answers short and practical, point to the exact field the user should change, \
and say so plainly when the page does not contain enough information to answer.";

const GUIDANCE_USER_NAME: &str = "guidance_user";
const GUIDANCE_USER_TEMPLATE: &str = "\
The user is filling in a {{ form_context }} and is focused on the field \"{{ field_label }}\" \
(field type: {{ field_type }}).
{% if field_options %}Options detected on the page:
{{ field_options }}
{% endif %}Provide guidance for this specific field. Return ONLY the JSON object.";

const CHAT_USER_NAME: &str = "chat_user";
const CHAT_USER_TEMPLATE: &str = "\
{% if turns %}Conversation so far:
{% for turn in turns %}{{ turn.role }}: {{ turn.content }}
{% endfor %}
{% endif %}Page context:
{% if title %}Title: {{ title }}
{% endif %}{% if url %}URL: {{ url }}
{% endif %}{% if page_text %}Page text:
{{ page_text }}
{% endif %}{% if form_values %}Current form values:
{% for field in form_values %}- {{ field.name }}: {{ field.value }}
{% endfor %}{% endif %}
User question: {{ message }}";

/// A `(system, user)` prompt pair ready for the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct RenderedTurn<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct RenderedField<'a> {
    name: &'a str,
    value: &'a str,
}

/// Builds model prompts for field guidance and page-aware chat.
pub struct PromptComposer {
    engine: TeraEngine,
}

impl PromptComposer {
    pub fn new() -> anyhow::Result<Self> {
        let engine = TeraEngine::with_templates(&[
            (GUIDANCE_USER_NAME, GUIDANCE_USER_TEMPLATE),
            (CHAT_USER_NAME, CHAT_USER_TEMPLATE),
        ])?;
        Ok(Self { engine })
    }

    /// Prompt pair for a single field. Label, kind and detected options are
    /// inserted exactly as received.
    pub fn guidance(&self, query: &FieldQuery) -> anyhow::Result<PromptPair> {
        let mut ctx = Context::new();
        ctx.insert("form_context", &query.form_context);
        ctx.insert("field_label", &query.field_label);
        ctx.insert("field_type", query.field_type.as_str());
        ctx.insert("field_options", query.detected_options().unwrap_or_default());

        Ok(PromptPair {
            system: GUIDANCE_SYSTEM_PROMPT.to_string(),
            user: self.engine.render(GUIDANCE_USER_NAME, &ctx)?,
        })
    }

    /// Prompt pair for the conversational mode: recent turns, then page
    /// context, then the new question.
    pub fn chat(&self, request: &ChatRequest) -> anyhow::Result<PromptPair> {
        let page = &request.page_context;

        let turns: Vec<RenderedTurn<'_>> = recent_turns(&request.chat_history)
            .iter()
            .map(|turn| RenderedTurn {
                role: turn.role.label(),
                content: &turn.content,
            })
            .collect();

        let form_values: Vec<RenderedField<'_>> = page
            .form_data
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(name, value)| RenderedField { name, value })
            .collect();

        let page_text = truncate_with_marker(&page.page_text, PAGE_TEXT_BUDGET, TRUNCATION_MARKER);

        let mut ctx = Context::new();
        ctx.insert("turns", &turns);
        ctx.insert("title", &page.title);
        ctx.insert("url", &page.url);
        ctx.insert("page_text", &*page_text);
        ctx.insert("form_values", &form_values);
        ctx.insert("message", &request.message);

        Ok(PromptPair {
            system: CHAT_SYSTEM_PROMPT.to_string(),
            user: self.engine.render(CHAT_USER_NAME, &ctx)?,
        })
    }
}

/// The last [`HISTORY_TURN_LIMIT`] turns, oldest first.
pub fn recent_turns(history: &[ConversationTurn]) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(HISTORY_TURN_LIMIT);
    &history[start..]
}
