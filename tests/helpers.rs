// Shared test helpers for upstream stubs and service setup.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;

use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::{json, Value};

use country_status::{build_service, Config, CountryService};

/// Path of the stubbed country directory.
pub const COUNTRIES_PATH: &str = "/v2/all";
/// Path of the stubbed rate table.
pub const RATES_PATH: &str = "/v6/latest/USD";

/// Config pointing at `server`, with fast retries and no DNS pre-check.
#[allow(dead_code)] // Used by other test files
pub fn test_config(db_path: &Path, server: &Server) -> Config {
    Config {
        countries_url: server.url(COUNTRIES_PATH).to_string(),
        rates_url: server.url(RATES_PATH).to_string(),
        db_path: db_path.to_path_buf(),
        timeout_seconds: 5,
        retry_attempts: 3,
        retry_delay_ms: 10,
        dns_precheck: false,
        seed: Some(7),
        ..Default::default()
    }
}

/// Builds a service over a file database in `dir`.
///
/// File databases are used so concurrent connections share one store.
#[allow(dead_code)] // Used by other test files
pub async fn file_service(dir: &Path, server: &Server) -> CountryService {
    build_service(&test_config(&dir.join("countries.db"), server))
        .await
        .expect("Failed to build service")
}

/// Expects `times` successful responses from both endpoints.
#[allow(dead_code)] // Used by other test files
pub fn expect_upstream(server: &Server, countries: Value, rates: Value, times: usize) {
    server.expect(
        Expectation::matching(request::method_path("GET", RATES_PATH))
            .times(times)
            .respond_with(json_encoded(json!({ "result": "success", "rates": rates }))),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", COUNTRIES_PATH))
            .times(times)
            .respond_with(json_encoded(countries)),
    );
}

/// The single-country upstream used throughout the tests.
#[allow(dead_code)] // Used by other test files
pub fn wakanda() -> (Value, Value) {
    (
        json!([{ "name": "Wakanda", "population": 1000, "currencies": [{ "code": "WKD" }] }]),
        json!({ "WKD": 2.0 }),
    )
}

/// A mixed directory covering every reconciliation branch.
#[allow(dead_code)] // Used by other test files
pub fn mixed_world() -> (Value, Value) {
    (
        json!([
            {
                "name": "Nigeria",
                "capital": "Abuja",
                "region": "Africa",
                "population": 206139587,
                "flag": "https://flagcdn.com/ng.svg",
                "currencies": [{ "code": "NGN", "name": "Nigerian naira", "symbol": "₦" }]
            },
            {
                "name": "Ghana",
                "capital": "Accra",
                "region": "Africa",
                "population": 31072945,
                "currencies": [{ "code": "GHS" }]
            },
            {
                "name": "Atlantis",
                "region": "Africa",
                "population": 500,
                "currencies": [{ "code": "ATL" }]
            },
            {
                "name": "Antarctica",
                "region": "Polar",
                "population": 1000,
                "currencies": []
            },
            { "name": "Ghost Town", "currencies": [{ "code": "NGN" }] },
            { "population": 42 }
        ]),
        json!({ "USD": 1, "NGN": 1600.5, "GHS": 15.25 }),
    )
}
