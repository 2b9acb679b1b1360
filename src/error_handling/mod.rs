//! Error handling and classification.
//!
//! This module provides:
//! - Error type definitions (initialization, database, network, service)
//! - The closed `ErrorKind` taxonomy matched at the boundary
//! - Classification of reqwest and sqlx failures
//! - The retry policy shared by upstream fetches

mod categorization;
mod types;

// Re-export public API
pub use categorization::{categorize_reqwest_error, classify_database_error, RetryPolicy};
pub use types::{DatabaseError, ErrorKind, InitializationError, NetworkError, ServiceError};

impl From<DatabaseError> for ServiceError {
    fn from(error: DatabaseError) -> Self {
        classify_database_error(error)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(error: sqlx::Error) -> Self {
        classify_database_error(DatabaseError::SqlError(error))
    }
}
