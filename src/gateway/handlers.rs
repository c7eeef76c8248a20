use super::{AppState, HistoryQuery, StatusCheckCreate};
use crate::error::{FormaidError, LlmError};
use crate::guidance::types::{ChatRequest, FieldQuery};
use crate::history::StatusCheck;
use axum::{
    extract::{Query, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};

/// Upper bound for `GET /api/status`.
const STATUS_LIST_LIMIT: usize = 1000;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text())
}

/// Map a broker failure onto a generic 500. Details stay in the log.
fn broker_error_response(err: &FormaidError) -> Response {
    let message = match err {
        FormaidError::Llm(LlmError::ModelUnavailable { .. }) => "Model provider is not configured",
        FormaidError::Llm(_) => "Model request failed",
        _ => "Internal server error",
    };
    tracing::error!(error = %err, "request failed");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// GET /api/
pub(super) async fn handle_root() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "Government Form Helper API" }))
}

/// GET /api/health
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    let invoker = state.broker.invoker();
    Json(serde_json::json!({
        "status": "ok",
        "provider": invoker.provider_name(),
        "model": invoker.model(),
        "history": state.broker.history().name(),
    }))
}

/// POST /api/form-help
pub(super) async fn handle_form_help(
    State(state): State<AppState>,
    payload: Result<Json<FieldQuery>, JsonRejection>,
) -> Response {
    let Json(query) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(&rejection),
    };

    tracing::info!(
        field_label = %query.field_label,
        field_type = %query.field_type,
        "form help requested"
    );

    match state.broker.field_guidance(&query).await {
        Ok(result) => Json(result).into_response(),
        Err(err) => broker_error_response(&err),
    }
}

/// GET /api/form-help/history?limit=N
pub(super) async fn handle_form_help_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let limit = state.config.history.clamp_limit(params.limit);
    match state.broker.recent_history(limit).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => broker_error_response(&err),
    }
}

/// POST /api/chat
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(&rejection),
    };

    tracing::info!(
        page_url = %request.page_context.url,
        turns = request.chat_history.len(),
        "chat requested"
    );

    match state.broker.chat(&request).await {
        Ok(reply) => Json(reply).into_response(),
        Err(err) => broker_error_response(&err),
    }
}

/// GET /api/chat/history?limit=N
pub(super) async fn handle_chat_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let limit = state.config.history.clamp_limit(params.limit);
    match state.broker.recent_chats(limit).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => broker_error_response(&err),
    }
}

/// POST /api/status
pub(super) async fn handle_create_status(
    State(state): State<AppState>,
    payload: Result<Json<StatusCheckCreate>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(body) => body,
        Err(rejection) => return rejection_response(&rejection),
    };

    let check = StatusCheck::new(body.client_name);
    match state.broker.history().record_status_check(&check).await {
        Ok(()) => Json(check).into_response(),
        Err(err) => broker_error_response(&FormaidError::from(err)),
    }
}

/// GET /api/status
pub(super) async fn handle_list_status(State(state): State<AppState>) -> Response {
    match state
        .broker
        .history()
        .status_checks(STATUS_LIST_LIMIT)
        .await
    {
        Ok(checks) => Json(checks).into_response(),
        Err(err) => broker_error_response(&FormaidError::from(err)),
    }
}

/// GET /api/extension/download
pub(super) async fn handle_extension_download(State(state): State<AppState>) -> Response {
    let extension = &state.config.extension;
    let Some(path) = extension.archive_path.as_ref() else {
        return error_response(StatusCode::NOT_FOUND, "Extension file not found");
    };

    match tokio::fs::read(path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", extension.file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "extension archive unavailable");
            error_response(StatusCode::NOT_FOUND, "Extension file not found")
        }
    }
}
