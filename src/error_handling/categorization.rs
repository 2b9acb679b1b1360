//! Error categorization and retry strategy.
//!
//! This module turns low-level failures (reqwest, sqlx) into the typed errors
//! of this crate and configures the retry strategy for upstream fetches.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use sqlx::error::ErrorKind as SqlErrorKind;
use tokio_retry::strategy::FixedInterval;

use super::types::{DatabaseError, NetworkError, ServiceError};

/// Captures the column list of a SQLite constraint message, e.g.
/// `UNIQUE constraint failed: countries.name` or `CHECK constraint failed: population`.
static CONSTRAINT_COLUMNS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"constraint failed: (.+)$").expect("constraint pattern is valid")
});

/// Retry policy shared by both upstream fetches.
///
/// `max_attempts` counts the initial attempt, so a policy of 3 sleeps at most
/// twice. A budget of 0 is treated as 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Creates the delay schedule for `tokio_retry`.
    ///
    /// The iterator yields one delay per retry (not per attempt), so it is
    /// limited to `max_attempts - 1` items.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        FixedInterval::new(self.delay).take(self.max_attempts - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::RETRY_MAX_ATTEMPTS,
            Duration::from_millis(crate::config::RETRY_DELAY_MS),
        )
    }
}

/// Categorizes a `reqwest::Error` into a `NetworkError`.
///
/// Status errors keep their code so the retry condition can decide on them;
/// transport errors are split into timeout, connect and generic request failures.
pub fn categorize_reqwest_error(url: &str, error: &reqwest::Error) -> NetworkError {
    let url = url.to_string();

    if let Some(status) = error.status() {
        return NetworkError::Status {
            url,
            status: status.as_u16(),
        };
    }

    if error.is_timeout() {
        NetworkError::Timeout { url }
    } else if error.is_connect() {
        NetworkError::Connect {
            url,
            message: error_chain_message(error),
        }
    } else if error.is_decode() || error.is_body() {
        NetworkError::Decode {
            url,
            message: error_chain_message(error),
        }
    } else {
        NetworkError::Request {
            url,
            message: error_chain_message(error),
        }
    }
}

/// Flattens an error and its sources into one line.
fn error_chain_message(error: &(dyn std::error::Error + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Classifies a storage failure for the boundary layer.
///
/// Constraint and type violations become `Validation` with one entry per
/// offending column; everything else is `Internal`.
pub fn classify_database_error(error: DatabaseError) -> ServiceError {
    let details = match &error {
        DatabaseError::SqlError(sqlx::Error::Database(db_err)) => {
            let describe: Option<fn(&str) -> String> = match db_err.kind() {
                SqlErrorKind::UniqueViolation => Some(|field| format!("{field} must be unique")),
                SqlErrorKind::NotNullViolation => Some(|field| format!("{field} cannot be null")),
                SqlErrorKind::CheckViolation => Some(|field| format!("{field} is invalid")),
                _ => None,
            };
            describe.map(|describe| constraint_details(db_err.message(), describe))
        }
        DatabaseError::SqlError(sqlx::Error::ColumnDecode { index, source }) => {
            let mut details = BTreeMap::new();
            details.insert(
                index.trim_matches('"').to_string(),
                format!("has an unexpected type: {source}"),
            );
            Some(details)
        }
        _ => None,
    };

    match details {
        Some(details) => ServiceError::Validation { details },
        None => ServiceError::Internal(error),
    }
}

/// Extracts per-column details from a SQLite constraint message.
///
/// Columns are reported as `table.column`; named CHECK constraints are reported
/// by name, and the migrations name them after their column.
fn constraint_details(message: &str, describe: fn(&str) -> String) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    match CONSTRAINT_COLUMNS.captures(message) {
        Some(caps) => {
            for column in caps[1].split(',') {
                let field = column
                    .trim()
                    .rsplit('.')
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if !field.is_empty() {
                    details.insert(field.clone(), describe(&field));
                }
            }
        }
        None => {
            details.insert("record".to_string(), message.to_string());
        }
    }
    if details.is_empty() {
        details.insert("record".to_string(), message.to_string());
    }
    details
}
