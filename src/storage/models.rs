// storage/models.rs
// Database models and types

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// A stored country.
///
/// Maps onto the `countries` table. Decimals are stored as TEXT and
/// timestamps as milliseconds since Unix epoch (`*_ms` columns).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRecord {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: i64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub estimated_gdp: Option<Decimal>,
    pub flag_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_refreshed_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for CountryRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            capital: row.try_get("capital")?,
            region: row.try_get("region")?,
            population: row.try_get("population")?,
            currency_code: row.try_get("currency_code")?,
            exchange_rate: decimal_column(row, "exchange_rate")?,
            estimated_gdp: decimal_column(row, "estimated_gdp")?,
            flag_url: row.try_get("flag_url")?,
            created_at: millis_to_datetime(row.try_get("created_at_ms")?),
            last_refreshed_at: millis_to_datetime(row.try_get("last_refreshed_at_ms")?),
        })
    }
}

/// Singleton refresh status.
///
/// Defaults to zero countries and no refresh until the first refresh commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStatus {
    pub total_countries: i64,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// What a committed batch left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub total: i64,
    pub refreshed_at: DateTime<Utc>,
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Option<Decimal>, sqlx::Error> {
    let text: Option<String> = row.try_get(column)?;
    text.map(|text| {
        Decimal::from_str(&text).map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

/// Text form written to decimal columns.
pub(crate) fn decimal_to_text(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.normalize().to_string())
}

pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
