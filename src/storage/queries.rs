// storage/queries.rs
// Read and delete operations on stored countries

use log::debug;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error_handling::DatabaseError;

use super::models::CountryRecord;

const COUNTRY_COLUMNS: &str = "id, name, capital, region, population, currency_code, \
     exchange_rate, estimated_gdp, flag_url, created_at_ms, last_refreshed_at_ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Name,
    EstimatedGdp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Ordering of `list_countries`. Ties are always broken by `name ASC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub field: SortField,
    pub direction: SortDirection,
    /// Place NULL values of `field` after all others; otherwise before.
    pub nulls_last: bool,
}

impl SortOrder {
    /// Parses the `sort` query parameter.
    ///
    /// Accepts `gdp_desc`, `gdp_asc`, `name_asc` and `name_desc`; anything else,
    /// including no value, yields the default `name ASC`.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("gdp_desc") => Self {
                field: SortField::EstimatedGdp,
                direction: SortDirection::Desc,
                nulls_last: true,
            },
            Some("gdp_asc") => Self {
                field: SortField::EstimatedGdp,
                direction: SortDirection::Asc,
                nulls_last: true,
            },
            Some("name_desc") => Self {
                field: SortField::Name,
                direction: SortDirection::Desc,
                nulls_last: false,
            },
            _ => Self::default(),
        }
    }
}

/// Filters and ordering for `list_countries`.
///
/// Filters are exact, case-sensitive matches combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryQuery {
    pub region: Option<String>,
    pub currency_code: Option<String>,
    pub sort: SortOrder,
}

/// Lists countries matching `query`.
pub async fn list_countries(
    pool: &SqlitePool,
    query: &CountryQuery,
) -> Result<Vec<CountryRecord>, DatabaseError> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {COUNTRY_COLUMNS} FROM countries"));

    let mut has_where = false;
    if let Some(region) = &query.region {
        builder.push(" WHERE region = ").push_bind(region.clone());
        has_where = true;
    }
    if let Some(code) = &query.currency_code {
        builder
            .push(if has_where { " AND " } else { " WHERE " })
            .push("currency_code = ")
            .push_bind(code.clone());
    }

    builder.push(order_by_clause(&query.sort));
    debug!("Listing countries: {}", builder.sql());

    let records = builder
        .build_query_as::<CountryRecord>()
        .fetch_all(pool)
        .await?;
    Ok(records)
}

fn order_by_clause(sort: &SortOrder) -> String {
    let direction = match sort.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    match sort.field {
        SortField::Name => format!(" ORDER BY name {direction}"),
        SortField::EstimatedGdp => {
            let nulls = if sort.nulls_last { "ASC" } else { "DESC" };
            format!(
                " ORDER BY estimated_gdp IS NULL {nulls}, \
                 CAST(estimated_gdp AS REAL) {direction}, name ASC"
            )
        }
    }
}

/// Looks up a country by exact, case-sensitive name.
pub async fn get_country(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<CountryRecord>, DatabaseError> {
    let record = sqlx::query_as::<_, CountryRecord>(&format!(
        "SELECT {COUNTRY_COLUMNS} FROM countries WHERE name = ?"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Deletes a country by exact name. Returns whether a row was removed.
///
/// The refresh status is left untouched; `total_countries` catches up on the
/// next refresh.
pub async fn delete_country(pool: &SqlitePool, name: &str) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM countries WHERE name = ?")
        .bind(name)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
