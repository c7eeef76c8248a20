pub mod schema;

pub use schema::{
    Config, ExtensionConfig, GatewayConfig, HistoryBackend, HistoryConfig, LlmConfig,
};
