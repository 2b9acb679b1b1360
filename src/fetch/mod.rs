//! Upstream fetching.
//!
//! Retrieves the country directory and the exchange rate table. Both calls
//! share one `RetryPolicy` and go through the same JSON GET path; an optional
//! DNS pre-check logs resolution problems before the first attempt.

mod dns;
mod request;
mod types;

use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use log::{debug, info, warn};

use crate::error_handling::{NetworkError, RetryPolicy};

pub use types::{RateTable, RawCountry, RawCurrency};

/// Display name of the country directory, used in error messages.
pub const COUNTRIES_SOURCE: &str = "REST Countries";

/// Display name of the exchange rate provider, used in error messages.
pub const RATES_SOURCE: &str = "Open ER API";

/// Fetches raw upstream data.
///
/// Cheap to clone; the HTTP client and resolver are shared.
#[derive(Clone)]
pub struct Fetcher {
    client: Arc<reqwest::Client>,
    resolver: Option<Arc<TokioAsyncResolver>>,
    retry: RetryPolicy,
}

impl Fetcher {
    /// Creates a fetcher. Passing `None` as resolver disables the DNS pre-check.
    pub fn new(
        client: Arc<reqwest::Client>,
        resolver: Option<Arc<TokioAsyncResolver>>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            resolver,
            retry,
        }
    }

    /// Fetches the currency rate table.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` once retries are exhausted, or immediately for a
    /// non-transient status or a payload without a `rates` object.
    pub async fn fetch_rates(&self, url: &str) -> Result<RateTable, NetworkError> {
        self.precheck(url).await;

        let body: types::RatesResponse =
            request::get_json_with_retry(&self.client, url, &self.retry).await?;
        let raw = body.rates.ok_or_else(|| NetworkError::Decode {
            url: url.to_string(),
            message: "response has no `rates` object".to_string(),
        })?;

        let (table, dropped) = RateTable::from_wire(raw);
        if !dropped.is_empty() {
            debug!(
                "Dropped {} unusable rate(s) from {url}: {}",
                dropped.len(),
                dropped.join(", ")
            );
        }
        if table.is_empty() {
            warn!("No usable exchange rates from {url}; GDP estimates will be null");
        }
        info!("Fetched {} exchange rates", table.len());
        Ok(table)
    }

    /// Fetches the raw country directory.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` once retries are exhausted, or immediately for a
    /// non-transient status or a body that is not a JSON array.
    pub async fn fetch_countries(&self, url: &str) -> Result<Vec<RawCountry>, NetworkError> {
        self.precheck(url).await;

        let countries: Vec<RawCountry> =
            request::get_json_with_retry(&self.client, url, &self.retry).await?;
        info!("Fetched {} raw countries", countries.len());
        Ok(countries)
    }

    async fn precheck(&self, url: &str) {
        if let Some(resolver) = &self.resolver {
            dns::precheck_host(url, resolver).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Fetcher, NetworkError, RetryPolicy};
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use std::sync::Arc;
    use std::time::Duration;

    fn fetcher(attempts: usize) -> Fetcher {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build client");
        Fetcher::new(
            Arc::new(client),
            None,
            RetryPolicy::new(attempts, Duration::from_millis(10)),
        )
    }

    #[tokio::test]
    async fn test_fetch_rates() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/v6/latest/USD")).respond_with(
                json_encoded(serde_json::json!({
                    "result": "success",
                    "base_code": "USD",
                    "rates": {"USD": 1, "NGN": 1600.5, "WKD": 2.0, "XXX": 0}
                })),
            ),
        );

        let table = fetcher(3)
            .fetch_rates(&server.url("/v6/latest/USD").to_string())
            .await
            .expect("rates fetch should succeed");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("WKD"), Some("2".parse().expect("decimal")));
        assert!(!table.contains("XXX"));
    }

    #[tokio::test]
    async fn test_fetch_rates_without_rates_object() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/rates"))
                .times(1)
                .respond_with(json_encoded(serde_json::json!({"result": "error"}))),
        );

        let err = fetcher(3)
            .fetch_rates(&server.url("/rates").to_string())
            .await
            .expect_err("missing rates is a decode error");
        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_countries() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/all")).respond_with(
                json_encoded(serde_json::json!([
                    {"name": "Wakanda", "population": 1000, "currencies": [{"code": "WKD"}]},
                    {"name": "Nowhere"}
                ])),
            ),
        );

        let countries = fetcher(3)
            .fetch_countries(&server.url("/all").to_string())
            .await
            .expect("countries fetch should succeed");
        assert_eq!(countries.len(), 2);
        assert_eq!(countries[0].name.as_deref(), Some("Wakanda"));
        assert_eq!(countries[1].population, None);
    }

    #[tokio::test]
    async fn test_fetch_countries_retries_transient_failure() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/all"))
                .times(2)
                .respond_with(httptest::cycle![
                    status_code(503),
                    json_encoded(serde_json::json!([])),
                ]),
        );

        let countries = fetcher(3)
            .fetch_countries(&server.url("/all").to_string())
            .await
            .expect("second attempt should succeed");
        assert!(countries.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_countries_not_found_is_single_attempt() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/all"))
                .times(1)
                .respond_with(status_code(404)),
        );

        let err = fetcher(3)
            .fetch_countries(&server.url("/all").to_string())
            .await
            .expect_err("404 is permanent");
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_with_resolver_on_ip_literal() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/all"))
                .respond_with(json_encoded(serde_json::json!([]))),
        );

        let client = Arc::new(reqwest::Client::new());
        let fetcher = Fetcher::new(
            client,
            Some(crate::initialization::init_resolver()),
            RetryPolicy::new(1, Duration::from_millis(1)),
        );
        let countries = fetcher
            .fetch_countries(&server.url("/all").to_string())
            .await
            .expect("pre-check is skipped for 127.0.0.1");
        assert!(countries.is_empty());
    }
}
