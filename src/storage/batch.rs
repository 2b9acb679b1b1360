// storage/batch.rs
// Atomic upsert of a reconciled batch

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error_handling::DatabaseError;
use crate::reconcile::CountryDraft;

use super::models::{decimal_to_text, BatchOutcome};
use super::status::upsert_status;

/// Upserts every draft and the refresh status in one transaction.
///
/// Drafts are keyed by `name`; an existing row keeps its `id` and
/// `created_at_ms`. `total` is counted inside the transaction, after the
/// upserts. On any failure the transaction is rolled back and nothing from
/// this batch, including the status, becomes visible.
pub async fn commit_batch(
    pool: &SqlitePool,
    drafts: &[CountryDraft],
    refreshed_at: DateTime<Utc>,
) -> Result<BatchOutcome, DatabaseError> {
    let mut tx = pool.begin().await.map_err(DatabaseError::SqlError)?;

    match write_batch(&mut tx, drafts, refreshed_at).await {
        Ok(total) => {
            tx.commit().await.map_err(|e| {
                error!("Failed to commit refresh batch: {e}");
                DatabaseError::SqlError(e)
            })?;
            info!(
                "Committed {} countries ({} total)",
                drafts.len(),
                total
            );
            Ok(BatchOutcome {
                total,
                refreshed_at,
            })
        }
        Err(e) => {
            error!("Refresh batch failed, rolling back: {e}");
            if let Err(rollback_err) = tx.rollback().await {
                error!("Rollback failed: {rollback_err}");
            }
            Err(e)
        }
    }
}

async fn write_batch(
    tx: &mut Transaction<'_, Sqlite>,
    drafts: &[CountryDraft],
    refreshed_at: DateTime<Utc>,
) -> Result<i64, DatabaseError> {
    let refreshed_ms = refreshed_at.timestamp_millis();

    for draft in drafts {
        debug!("Upserting country {}", draft.name);
        upsert_country(tx, draft, refreshed_ms).await?;
    }

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries")
        .fetch_one(&mut **tx)
        .await?;

    upsert_status(tx, total, refreshed_at).await?;
    Ok(total)
}

async fn upsert_country(
    tx: &mut Transaction<'_, Sqlite>,
    draft: &CountryDraft,
    refreshed_ms: i64,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO countries (
            name, capital, region, population, currency_code, exchange_rate,
            estimated_gdp, flag_url, created_at_ms, last_refreshed_at_ms
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(name) DO UPDATE SET
            capital=excluded.capital,
            region=excluded.region,
            population=excluded.population,
            currency_code=excluded.currency_code,
            exchange_rate=excluded.exchange_rate,
            estimated_gdp=excluded.estimated_gdp,
            flag_url=excluded.flag_url,
            last_refreshed_at_ms=excluded.last_refreshed_at_ms",
    )
    .bind(&draft.name)
    .bind(&draft.capital)
    .bind(&draft.region)
    .bind(draft.population)
    .bind(&draft.currency_code)
    .bind(decimal_to_text(draft.exchange_rate))
    .bind(decimal_to_text(draft.estimated_gdp))
    .bind(&draft.flag_url)
    .bind(refreshed_ms)
    .bind(refreshed_ms)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        debug!("Upsert of {} failed: {e}", draft.name);
        DatabaseError::SqlError(e)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::{classify_database_error, ServiceError};
    use crate::storage::models::millis_to_datetime;
    use crate::storage::status::get_status;
    use crate::storage::test_helpers::{create_test_pool, draft};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_commit_batch_inserts_and_records_status() {
        let pool = create_test_pool().await;
        let at = millis_to_datetime(1_700_000_000_000);

        let outcome = commit_batch(&pool, &[draft("Alpha", 10), draft("Beta", 20)], at)
            .await
            .expect("commit should succeed");
        assert_eq!(outcome.total, 2);
        assert_eq!(outcome.refreshed_at, at);

        let status = get_status(&pool).await.expect("status");
        assert_eq!(status.total_countries, 2);
        assert_eq!(status.last_refreshed_at, Some(at));
    }

    #[tokio::test]
    async fn test_commit_batch_upserts_by_name_and_keeps_created_at() {
        let pool = create_test_pool().await;
        let first = millis_to_datetime(1_000);
        let second = millis_to_datetime(2_000);

        commit_batch(&pool, &[draft("Alpha", 10)], first)
            .await
            .expect("first commit");
        let mut updated = draft("Alpha", 99);
        updated.currency_code = Some("ALP".to_string());
        updated.exchange_rate = None;
        updated.estimated_gdp = None;
        let outcome = commit_batch(&pool, &[updated], second)
            .await
            .expect("second commit");
        assert_eq!(outcome.total, 1);

        let (population, code, gdp, created, refreshed): (i64, Option<String>, Option<String>, i64, i64) =
            sqlx::query_as(
                "SELECT population, currency_code, estimated_gdp, created_at_ms, last_refreshed_at_ms
                 FROM countries WHERE name = 'Alpha'",
            )
            .fetch_one(&pool)
            .await
            .expect("row exists");
        assert_eq!(population, 99);
        assert_eq!(code.as_deref(), Some("ALP"));
        assert_eq!(gdp, None);
        assert_eq!(created, 1_000);
        assert_eq!(refreshed, 2_000);
    }

    #[tokio::test]
    async fn test_total_counts_rows_outside_the_batch() {
        let pool = create_test_pool().await;
        commit_batch(&pool, &[draft("Alpha", 1), draft("Beta", 1)], millis_to_datetime(1))
            .await
            .expect("first commit");
        let outcome = commit_batch(&pool, &[draft("Gamma", 1)], millis_to_datetime(2))
            .await
            .expect("second commit");
        assert_eq!(outcome.total, 3);
    }

    #[tokio::test]
    async fn test_failing_record_rolls_back_whole_batch() {
        let pool = create_test_pool().await;
        let before = millis_to_datetime(1_000);
        commit_batch(&pool, &[draft("Existing", 5)], before)
            .await
            .expect("seed commit");

        let mut bad = draft("Broken", 1);
        bad.currency_code = Some("WAY-TOO-LONG-CODE".to_string());
        let err = commit_batch(
            &pool,
            &[draft("Existing", 500), draft("Fresh", 1), bad],
            millis_to_datetime(2_000),
        )
        .await
        .expect_err("currency_code check must fail");

        match classify_database_error(err) {
            ServiceError::Validation { details } => {
                assert!(details.contains_key("currency_code"), "{details:?}");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM countries ORDER BY name")
            .fetch_all(&pool)
            .await
            .expect("list names");
        assert_eq!(names, vec!["Existing"]);
        let population: i64 =
            sqlx::query_scalar("SELECT population FROM countries WHERE name = 'Existing'")
                .fetch_one(&pool)
                .await
                .expect("population");
        assert_eq!(population, 5);

        let status = get_status(&pool).await.expect("status");
        assert_eq!(status.total_countries, 1);
        assert_eq!(status.last_refreshed_at, Some(before));
    }

    #[tokio::test]
    async fn test_empty_batch_still_records_status() {
        let pool = create_test_pool().await;
        let outcome = commit_batch(&pool, &[], millis_to_datetime(5))
            .await
            .expect("empty commit");
        assert_eq!(outcome.total, 0);
        let status = get_status(&pool).await.expect("status");
        assert_eq!(status.last_refreshed_at, Some(millis_to_datetime(5)));
    }

    #[tokio::test]
    async fn test_decimals_round_trip_through_text() {
        let pool = create_test_pool().await;
        let mut d = draft("Precise", 3);
        d.currency_code = Some("PRC".to_string());
        d.exchange_rate = Some("1600.25000000".parse::<Decimal>().expect("decimal"));
        d.estimated_gdp = Some("1234567890123.12345678".parse::<Decimal>().expect("decimal"));
        commit_batch(&pool, &[d], millis_to_datetime(1))
            .await
            .expect("commit");

        let (rate, gdp): (String, String) =
            sqlx::query_as("SELECT exchange_rate, estimated_gdp FROM countries")
                .fetch_one(&pool)
                .await
                .expect("row");
        assert_eq!(rate, "1600.25");
        assert_eq!(gdp, "1234567890123.12345678");
    }
}
