// ── Infrastructure ───────────────────────────────────────────────────────────
pub mod http_client;
pub mod scrub;
pub mod traits;

// ── Construction + invocation ───────────────────────────────────────────────
pub mod factory;
pub mod invoker;

// ── Provider implementations ────────────────────────────────────────────────
pub mod compatible;
pub mod gemini;

// ── Infrastructure re-exports ───────────────────────────────────────────────
pub use http_client::build_provider_client_with_timeout;
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;

// ── Provider + factory re-exports ───────────────────────────────────────────
pub use compatible::OpenAiCompatibleProvider;
pub use factory::{create_invoker, create_provider};
pub use gemini::GeminiProvider;
pub use invoker::{ModelInvoker, ProviderInvoker};
