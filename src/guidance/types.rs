use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const DEFAULT_FORM_CONTEXT: &str = "generic government form";

/// Kind of HTML control the field is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Input,
    Select,
    #[serde(other)]
    Other,
}

impl FieldKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Select => "select",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "input" => Self::Input,
            "select" => Self::Select,
            _ => Self::Other,
        })
    }
}

/// One form field the user asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldQuery {
    pub field_label: String,
    #[serde(default)]
    pub field_type: FieldKind,
    /// Option text scraped from the page for select/radio controls.
    #[serde(default)]
    pub field_options: Option<String>,
    #[serde(default = "default_form_context")]
    pub form_context: String,
}

fn default_form_context() -> String {
    DEFAULT_FORM_CONTEXT.into()
}

impl FieldQuery {
    pub fn new(field_label: impl Into<String>, field_type: FieldKind) -> Self {
        Self {
            field_label: field_label.into(),
            field_type,
            field_options: None,
            form_context: default_form_context(),
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.field_options = Some(options.into());
        self
    }

    pub fn with_form_context(mut self, form_context: impl Into<String>) -> Self {
        self.form_context = form_context.into();
        self
    }

    /// Detected options, if the client sent any non-blank text.
    pub fn detected_options(&self) -> Option<&str> {
        self.field_options
            .as_deref()
            .filter(|options| !options.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub recommendation: String,
}

/// The strict guidance contract returned for every field query.
///
/// `needs_interaction` is true exactly when `clarification_question` is set
/// and `question_options` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidanceResult {
    pub needs_interaction: bool,
    pub clarification_question: Option<String>,
    pub question_options: Vec<QuestionOption>,
    pub advice: String,
    pub warning: String,
    pub field_label: String,
    pub recommended_value: Option<String>,
}

impl GuidanceResult {
    pub fn satisfies_interaction_invariant(&self) -> bool {
        self.needs_interaction
            == (self.clarification_question.is_some() && !self.question_options.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

/// Snapshot of the page the user is filling in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContext {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub form_data: BTreeMap<String, String>,
    #[serde(default)]
    pub page_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub page_context: PageContext,
    /// Oldest first.
    #[serde(default)]
    pub chat_history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}
