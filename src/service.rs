//! Refresh orchestration and the operations exposed to the boundary.
//!
//! `CountryService` owns every resource it needs; nothing is held in module
//! state. Refreshes are single-flight: a second caller waits for the running
//! refresh to finish and then performs its own.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SubsecRound, Utc};
use log::info;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error_handling::ServiceError;
use crate::fetch::{Fetcher, COUNTRIES_SOURCE, RATES_SOURCE};
use crate::initialization::{init_client, init_resolver};
use crate::reconcile::{reconcile_batch, MultiplierSource, RandomMultiplier};
use crate::storage::{
    self, commit_batch, init_db_pool_with_path, run_migrations, CountryQuery, CountryRecord,
    RefreshStatus,
};

/// Upstream endpoints read by a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrls {
    pub countries: String,
    pub rates: String,
}

impl SourceUrls {
    pub fn from_config(config: &Config) -> Self {
        Self {
            countries: config.countries_url.clone(),
            rates: config.rates_url.clone(),
        }
    }
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total_countries: i64,
    pub refreshed_at: DateTime<Utc>,
    /// Raw entries left out for a missing name or population.
    pub skipped: usize,
}

pub struct CountryService {
    pool: Arc<SqlitePool>,
    fetcher: Fetcher,
    urls: SourceUrls,
    refresh_lock: Mutex<Box<dyn MultiplierSource>>,
}

impl CountryService {
    pub fn new(
        pool: Arc<SqlitePool>,
        fetcher: Fetcher,
        urls: SourceUrls,
        multiplier: Box<dyn MultiplierSource>,
    ) -> Self {
        Self {
            pool,
            fetcher,
            urls,
            refresh_lock: Mutex::new(multiplier),
        }
    }

    /// Fetches both sources, reconciles and commits one snapshot.
    ///
    /// Rates are fetched before countries. A fetch failure aborts before any
    /// write; a storage failure rolls the whole batch back.
    pub async fn refresh(&self) -> Result<RefreshSummary, ServiceError> {
        let mut multiplier = self.refresh_lock.lock().await;
        let started = Utc::now().trunc_subsecs(3);
        info!("Refresh started at {}", started.to_rfc3339());

        let rates = self
            .fetcher
            .fetch_rates(&self.urls.rates)
            .await
            .map_err(|source| ServiceError::ExternalSource {
                source_name: RATES_SOURCE,
                source,
            })?;
        let countries = self
            .fetcher
            .fetch_countries(&self.urls.countries)
            .await
            .map_err(|source| ServiceError::ExternalSource {
                source_name: COUNTRIES_SOURCE,
                source,
            })?;

        let batch = reconcile_batch(&countries, &rates, &mut **multiplier);
        let outcome = commit_batch(&self.pool, &batch.drafts, started).await?;

        info!(
            "Refresh complete: {} stored, {} skipped, {} total",
            batch.drafts.len(),
            batch.skipped,
            outcome.total
        );
        Ok(RefreshSummary {
            total_countries: outcome.total,
            refreshed_at: outcome.refreshed_at,
            skipped: batch.skipped,
        })
    }

    pub async fn status(&self) -> Result<RefreshStatus, ServiceError> {
        Ok(storage::get_status(&self.pool).await?)
    }

    pub async fn list(&self, query: &CountryQuery) -> Result<Vec<CountryRecord>, ServiceError> {
        Ok(storage::list_countries(&self.pool, query).await?)
    }

    pub async fn get_by_name(&self, name: &str) -> Result<CountryRecord, ServiceError> {
        storage::get_country(&self.pool, name)
            .await?
            .ok_or_else(|| ServiceError::NotFound {
                name: name.to_string(),
            })
    }

    pub async fn delete_by_name(&self, name: &str) -> Result<(), ServiceError> {
        if storage::delete_country(&self.pool, name).await? {
            info!("Deleted country {name}");
            Ok(())
        } else {
            Err(ServiceError::NotFound {
                name: name.to_string(),
            })
        }
    }
}

/// Wires a service from configuration: HTTP client, optional resolver,
/// migrated database and the multiplier source.
pub async fn build_service(config: &Config) -> Result<CountryService> {
    let client = init_client(config).context("Failed to initialize HTTP client")?;
    let resolver = config.dns_precheck.then(init_resolver);
    let fetcher = Fetcher::new(client, resolver, config.retry_policy());

    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(CountryService::new(
        pool,
        fetcher,
        SourceUrls::from_config(config),
        Box::new(RandomMultiplier::from_seed_option(config.seed)),
    ))
}
