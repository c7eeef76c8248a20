mod core;
mod extension;
mod gateway;
mod history;
mod llm;

pub use core::Config;
pub use extension::ExtensionConfig;
pub use gateway::GatewayConfig;
pub use history::{HistoryBackend, HistoryConfig};
pub use llm::LlmConfig;
