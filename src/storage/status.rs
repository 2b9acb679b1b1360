// storage/status.rs
// Singleton refresh status

use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::error_handling::DatabaseError;

use super::models::{millis_to_datetime, RefreshStatus};

/// Reads the refresh status, or the zero status when no refresh has committed yet.
pub async fn get_status(pool: &SqlitePool) -> Result<RefreshStatus, DatabaseError> {
    let row = sqlx::query(
        "SELECT total_countries, last_refreshed_at_ms FROM system_status WHERE id = 1",
    )
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(RefreshStatus {
            total_countries: row.try_get("total_countries")?,
            last_refreshed_at: row
                .try_get::<Option<i64>, _>("last_refreshed_at_ms")?
                .map(millis_to_datetime),
        }),
        None => Ok(RefreshStatus::default()),
    }
}

/// Overwrites the status row inside the refresh transaction.
pub(crate) async fn upsert_status(
    tx: &mut Transaction<'_, Sqlite>,
    total: i64,
    refreshed_at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    sqlx::query(
        "INSERT INTO system_status (id, total_countries, last_refreshed_at_ms)
         VALUES (1, ?, ?)
         ON CONFLICT(id) DO UPDATE SET
            total_countries=excluded.total_countries,
            last_refreshed_at_ms=excluded.last_refreshed_at_ms",
    )
    .bind(total)
    .bind(refreshed_at.timestamp_millis())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
