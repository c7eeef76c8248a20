use super::handlers::{
    handle_chat, handle_chat_history, handle_create_status, handle_extension_download,
    handle_form_help, handle_form_help_history, handle_health, handle_list_status, handle_root,
};
use super::{AppState, CHAT_MAX_BODY_SIZE, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use crate::config::Config;
use crate::guidance::GuidanceBroker;
use crate::history::create_history_store;
use crate::llm::create_invoker;
use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Returns true when the bind address is not a loopback address.
fn is_public_bind(host: &str) -> bool {
    !matches!(
        host,
        "127.0.0.1" | "localhost" | "::1" | "[::1]" | "0:0:0:0:0:0:0:1"
    )
}

/// Run the HTTP gateway until Ctrl-C / SIGTERM.
pub async fn run_gateway(host: &str, port: u16, config: Arc<Config>) -> Result<()> {
    if is_public_bind(host) && !config.gateway.allow_public_bind {
        anyhow::bail!(
            "Refusing to bind to {host}: the gateway would be reachable from other machines.\n\
             Fix: use --host 127.0.0.1 (default), or set\n\
             [gateway] allow_public_bind = true in config.toml."
        );
    }

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, config, shutdown_signal()).await
}

/// Run the HTTP gateway from a pre-bound listener until `shutdown` resolves.
pub async fn run_gateway_with_listener<F>(
    listener: tokio::net::TcpListener,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(config).await?;
    serve(listener, state, shutdown).await
}

/// Wire the history store, model invoker and broker from config.
pub async fn build_state(config: Arc<Config>) -> Result<AppState> {
    let history = create_history_store(&config).await?;
    let invoker = create_invoker(&config.llm).context("create model invoker")?;
    if !invoker.is_available() {
        tracing::warn!(
            provider = %config.llm.provider,
            "no API key configured; model requests will fail until one is set"
        );
    }

    let broker = GuidanceBroker::new(Arc::new(invoker), history)?;
    Ok(AppState {
        config,
        broker: Arc::new(broker),
    })
}

/// Serve `state` on `listener`. The history store is closed after shutdown.
pub async fn serve<F>(listener: tokio::net::TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener
        .local_addr()
        .context("get gateway listener local address")?;
    tracing::info!(
        addr = %local_addr,
        provider = %state.broker.invoker().provider_name(),
        model = %state.broker.invoker().model(),
        "gateway listening"
    );

    let history = Arc::clone(state.broker.history());
    let app = build_app(state);
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve HTTP gateway");

    history.close().await;
    tracing::info!("gateway stopped");
    served
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if config.gateway.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .gateway
        .cors_origins
        .iter()
        .filter_map(|o| o.trim().parse().ok())
        .collect();
    layer.allow_origin(origins).allow_credentials(true)
}

pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .route("/api", get(handle_root))
        .route("/api/", get(handle_root))
        .route("/api/health", get(handle_health))
        .route("/api/form-help", post(handle_form_help))
        .route("/api/form-help/history", get(handle_form_help_history))
        .route("/api/chat/history", get(handle_chat_history))
        .route(
            "/api/status",
            get(handle_list_status).post(handle_create_status),
        )
        .route("/api/extension/download", get(handle_extension_download))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE));

    let chat = Router::new()
        .route("/api/chat", post(handle_chat))
        .layer(DefaultBodyLimit::max(CHAT_MAX_BODY_SIZE))
        .layer(RequestBodyLimitLayer::new(CHAT_MAX_BODY_SIZE));

    api.merge(chat)
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(cors)
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
