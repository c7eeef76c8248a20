//! Axum-based HTTP gateway for the browser extension.
//!
//! - Request body size limits (64KB max, 2MB for `/api/chat` page text)
//! - Request timeouts (120s, above the model timeout)
//! - CORS from `[gateway] cors_origins`
//! - Graceful shutdown, then the history store is closed

mod handlers;
mod server;

pub use server::{
    build_app, build_state, run_gateway, run_gateway_with_listener, serve, shutdown_signal,
};

use crate::config::Config;
use crate::guidance::GuidanceBroker;
use std::sync::Arc;

/// Maximum request body size (64KB) -- page text is budgeted well below this
pub const MAX_BODY_SIZE: usize = 65_536;
/// Body limit for `/api/chat` (2MB) -- raw page text is cut to the prompt
/// budget server-side, so whole pages must get through
pub const CHAT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Request timeout (120s) -- longer than the model timeout so model failures
/// surface as 500 rather than 408
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broker: Arc<GuidanceBroker>,
}

/// `?limit=N` on history endpoints
#[derive(Debug, Default, serde::Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

/// POST /api/status body
#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct StatusCheckCreate {
    pub client_name: String,
}
