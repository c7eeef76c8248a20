//! Map a model's JSON reply onto [`GuidanceResult`].
//!
//! Reconciliation never fails: every value, however malformed, ends in a
//! result whose `needs_interaction` flag agrees with its question and options.

use super::types::{FieldQuery, GuidanceResult, QuestionOption};
use serde_json::Value;

pub const DEFAULT_ADVICE: &str = "Enter the required information accurately.";
pub const DEFAULT_WARNING: &str = "Double-check for any typos before submitting.";

/// Build the contract result from a parsed model reply.
pub fn reconcile(parsed: &Value, query: &FieldQuery) -> GuidanceResult {
    let requested_interaction = parsed
        .get("needs_interaction")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let question_options = if requested_interaction {
        parsed
            .get("question_options")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(coerce_option).collect())
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    let mut result = GuidanceResult {
        needs_interaction: requested_interaction,
        clarification_question: optional_text(parsed, "clarification_question"),
        question_options,
        advice: text_or(parsed, "advice", DEFAULT_ADVICE),
        warning: text_or(parsed, "warning", DEFAULT_WARNING),
        field_label: query.field_label.clone(),
        recommended_value: optional_text(parsed, "recommended_value"),
    };

    enforce_interaction_invariant(&mut result);
    result
}

/// Fixed, schema-valid answer used when the model reply cannot be parsed.
pub fn fallback(query: &FieldQuery) -> GuidanceResult {
    GuidanceResult {
        needs_interaction: false,
        clarification_question: None,
        question_options: Vec::new(),
        advice: DEFAULT_ADVICE.to_string(),
        warning: DEFAULT_WARNING.to_string(),
        field_label: query.field_label.clone(),
        recommended_value: None,
    }
}

fn enforce_interaction_invariant(result: &mut GuidanceResult) {
    if result.needs_interaction
        && (result.question_options.is_empty() || result.clarification_question.is_none())
    {
        tracing::debug!(
            field = %result.field_label,
            "model requested interaction without a usable question; demoting"
        );
        result.needs_interaction = false;
    }

    if !result.needs_interaction {
        result.question_options.clear();
    }
}

fn coerce_option(item: &Value) -> Option<QuestionOption> {
    let object = item.as_object()?;
    let value = scalar_text(object.get("value"));
    // An option without a value cannot be submitted.
    if value.trim().is_empty() {
        return None;
    }
    let label = scalar_text(object.get("label"));

    Some(QuestionOption {
        label,
        value,
        recommendation: scalar_text(object.get("recommendation")),
    })
}

/// Strings pass through verbatim; numbers and booleans are rendered; anything
/// else (missing, null, arrays, objects) becomes empty.
fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

fn optional_text(parsed: &Value, key: &str) -> Option<String> {
    parsed
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(ToString::to_string)
}

fn text_or(parsed: &Value, key: &str, default: &str) -> String {
    optional_text(parsed, key).unwrap_or_else(|| default.to_string())
}
