use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `formaid`.
///
/// Each subsystem defines its own error enum. The gateway matches on these to
/// pick an HTTP status; adapters internally use `anyhow::Result` for context
/// chains and convert at the subsystem boundary.
#[derive(Debug, Error)]
pub enum FormaidError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── LLM / Provider ──────────────────────────────────────────────────
    #[error("llm: {0}")]
    Llm(#[from] LlmError),

    // ── Model output ────────────────────────────────────────────────────
    #[error("parse: {0}")]
    Parse(#[from] ParseError),

    // ── History ─────────────────────────────────────────────────────────
    #[error("history: {0}")]
    History(#[from] HistoryError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── LLM / Provider errors ──────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    /// No access credential is configured for the provider.
    #[error("model provider {provider} unavailable: no API key configured")]
    ModelUnavailable { provider: String },

    #[error("provider {provider} request failed: {message}")]
    RequestFailed { provider: String, message: String },

    #[error("provider {provider} timed out after {secs}s")]
    Timeout { provider: String, secs: u64 },
}

impl LlmError {
    /// Configuration problems are reported separately from transport failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ModelUnavailable { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::ModelUnavailable { provider }
            | Self::RequestFailed { provider, .. }
            | Self::Timeout { provider, .. } => provider,
        }
    }
}

// ─── Model output errors ────────────────────────────────────────────────────

/// The model replied, but the reply is not valid JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model reply is not valid JSON: {message}")]
pub struct ParseError {
    /// Raw reply exactly as received, kept for diagnostics.
    pub raw: String,
    pub message: String,
}

// ─── History errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("backend not available: {0}")]
    BackendUnavailable(String),

    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, FormaidError>;
