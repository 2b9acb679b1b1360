//! Shared test helpers for storage module tests.
//!
//! This module provides common utilities for database setup and test data creation
//! used across storage module tests.

#[cfg(test)]
use sqlx::SqlitePool;

#[cfg(test)]
use crate::reconcile::CountryDraft;
#[cfg(test)]
use crate::storage::run_migrations;

/// Creates a test database pool with migrations applied.
/// Uses an in-memory database for fast test execution.
#[cfg(test)]
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Creates a draft with no currency, which reconciles to a zero GDP.
#[cfg(test)]
pub fn draft(name: &str, population: i64) -> CountryDraft {
    CountryDraft {
        name: name.to_string(),
        capital: None,
        region: None,
        population,
        currency_code: None,
        exchange_rate: None,
        estimated_gdp: Some(rust_decimal::Decimal::ZERO),
        flag_url: None,
    }
}
