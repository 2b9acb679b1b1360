//! Country handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::info;

use super::super::types::{
    ApiError, AppState, ListParams, MessageResponse, RefreshResponse,
};
use crate::error_handling::{DatabaseError, ServiceError};
use crate::storage::{CountryQuery, CountryRecord};

/// `POST /countries/refresh`
///
/// The refresh runs on its own task, so a client that disconnects does not
/// cancel the fetch or roll back the transaction.
pub async fn refresh_handler(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    info!("Refresh requested over HTTP");
    let service = Arc::clone(&state.service);
    let summary = tokio::spawn(async move { service.refresh().await })
        .await
        .map_err(|e| ServiceError::Internal(DatabaseError::from(e)))??;
    Ok(Json(summary.into()))
}

/// `GET /countries?region=&currency=&sort=`
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CountryRecord>>, ApiError> {
    let query = CountryQuery::from(params);
    Ok(Json(state.service.list(&query).await?))
}

/// `GET /countries/:name`
pub async fn get_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CountryRecord>, ApiError> {
    Ok(Json(state.service.get_by_name(&name).await?))
}

/// `DELETE /countries/:name`
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state.service.delete_by_name(&name).await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Country deleted successfully",
        }),
    ))
}
