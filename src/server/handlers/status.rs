//! Status, liveness and fallback handlers.

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::Json;

use super::super::types::{ApiError, AppState, ErrorBody, MessageResponse};
use crate::storage::RefreshStatus;

/// `GET /status`
pub async fn status_handler(State(state): State<AppState>) -> Result<Json<RefreshStatus>, ApiError> {
    Ok(Json(state.service.status().await?))
}

/// `GET /ping`
pub async fn ping_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Server is running!",
    })
}

/// Any unmatched route.
pub async fn not_found_handler(uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: format!("Not Found - {target}"),
            details: None,
        }),
    )
}
