//! Error type definitions.
//!
//! This module defines the error types used throughout the application and the
//! closed `ErrorKind` taxonomy consumed at the boundary.

use std::collections::BTreeMap;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::config::{
    HTTP_STATUS_BAD_GATEWAY, HTTP_STATUS_GATEWAY_TIMEOUT, HTTP_STATUS_REQUEST_TIMEOUT,
    HTTP_STATUS_SERVICE_UNAVAILABLE, HTTP_STATUS_TOO_MANY_REQUESTS,
};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// The task running a refresh transaction panicked or was cancelled.
    #[error("Refresh task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

/// Failure of a single upstream fetch.
///
/// Only transport-level failures and a handful of gateway statuses are
/// transient; everything else fails the fetch on the first attempt.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid payload from {url}: {message}")]
    Decode { url: String, message: String },
}

impl NetworkError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            NetworkError::Timeout { .. }
            | NetworkError::Connect { .. }
            | NetworkError::Request { .. } => true,
            NetworkError::Status { status, .. } => matches!(
                *status,
                HTTP_STATUS_REQUEST_TIMEOUT
                    | HTTP_STATUS_TOO_MANY_REQUESTS
                    | HTTP_STATUS_BAD_GATEWAY
                    | HTTP_STATUS_SERVICE_UNAVAILABLE
                    | HTTP_STATUS_GATEWAY_TIMEOUT
            ),
            NetworkError::Decode { .. } => false,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            NetworkError::Timeout { url }
            | NetworkError::Connect { url, .. }
            | NetworkError::Request { url, .. }
            | NetworkError::Status { url, .. }
            | NetworkError::Decode { url, .. } => url,
        }
    }
}

/// Errors surfaced by `CountryService` operations.
///
/// Every variant maps onto exactly one `ErrorKind`; the boundary layer matches
/// on the kind, never on message text.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// An upstream source could not be fetched after retries were exhausted.
    #[error("Could not fetch data from {source_name}: {source}")]
    ExternalSource {
        source_name: &'static str,
        source: NetworkError,
    },

    /// A storage constraint rejected the data.
    #[error("Validation failed: {}", format_details(.details))]
    Validation { details: BTreeMap<String, String> },

    /// A name-keyed lookup matched nothing.
    #[error("Country not found: {name}")]
    NotFound { name: String },

    /// Any other storage or transaction failure.
    #[error("Internal error: {0}")]
    Internal(#[source] DatabaseError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::ExternalSource { .. } => ErrorKind::ExternalSource,
            ServiceError::Validation { .. } => ErrorKind::Validation,
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }
}

fn format_details(details: &BTreeMap<String, String>) -> String {
    details
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Closed taxonomy of failures consumed by the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    /// Fetch failure after retries exhausted (service unavailable)
    ExternalSource,
    /// Storage constraint violation, reported with field-level details
    Validation,
    /// Lookup miss on a name-keyed query
    NotFound,
    /// Anything else; surfaced generically, logged in full
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ExternalSource => "External source error",
            ErrorKind::Validation => "Validation error",
            ErrorKind::NotFound => "Not found error",
            ErrorKind::Internal => "Internal error",
        }
    }
}
