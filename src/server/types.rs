//! Server state, response bodies and error mapping.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::{Deserialize, Serialize};

use crate::error_handling::{ErrorKind, ServiceError};
use crate::service::{CountryService, RefreshSummary};
use crate::storage::{CountryQuery, SortOrder};

/// Shared state for the HTTP server
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CountryService>,
}

/// Query string of `GET /countries`. Empty values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub currency: Option<String>,
    pub sort: Option<String>,
}

impl From<ListParams> for CountryQuery {
    fn from(params: ListParams) -> Self {
        let present = |value: Option<String>| value.filter(|v| !v.is_empty());
        CountryQuery {
            sort: SortOrder::from_param(params.sort.as_deref()),
            region: present(params.region),
            currency_code: present(params.currency),
        }
    }
}

/// JSON response for `POST /countries/refresh`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub status: &'static str,
    pub total_countries: i64,
    pub last_refreshed_at: DateTime<Utc>,
}

impl From<RefreshSummary> for RefreshResponse {
    fn from(summary: RefreshSummary) -> Self {
        Self {
            status: "success",
            total_countries: summary.total_countries,
            last_refreshed_at: summary.refreshed_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Message(String),
    Fields(BTreeMap<String, String>),
}

/// A `ServiceError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = status_for(error.kind());
        let body = match error {
            ServiceError::ExternalSource { .. } => {
                warn!("Upstream unavailable: {error}");
                ErrorBody {
                    error: "External data source unavailable".to_string(),
                    details: Some(ErrorDetails::Message(error.to_string())),
                }
            }
            ServiceError::Validation { details } => {
                warn!("Validation failed: {details:?}");
                ErrorBody {
                    error: "Validation failed".to_string(),
                    details: Some(ErrorDetails::Fields(details)),
                }
            }
            ServiceError::NotFound { .. } => ErrorBody {
                error: "Country not found".to_string(),
                details: None,
            },
            ServiceError::Internal(_) => {
                error!("Internal error: {}", error_chain(&error));
                ErrorBody {
                    error: "Internal server error".to_string(),
                    details: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::ExternalSource => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        // thiserror messages often embed their source already
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
