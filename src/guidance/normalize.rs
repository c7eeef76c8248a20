use crate::error::ParseError;
use serde_json::Value;

const FENCE: &str = "```";

/// Strip an optional Markdown code fence around a model reply.
///
/// The opening fence may carry a language tag (`json`, `JSON`, ...). Text
/// without fences is returned trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        text = &rest[tag_len..];
    }

    if let Some(rest) = text.strip_suffix(FENCE) {
        text = rest;
    }

    text.trim()
}

/// Turn raw model text into a JSON value, or report why it isn't one.
pub fn normalize(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(strip_code_fence(raw)).map_err(|e| ParseError {
        raw: raw.to_string(),
        message: e.to_string(),
    })
}
