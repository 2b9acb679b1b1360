//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the application,
//! including upstream endpoints, timeouts, retry budget and decimal scale.

use std::time::Duration;

/// Default country directory endpoint (REST Countries v2, trimmed to the fields we read).
pub const DEFAULT_COUNTRIES_API_URL: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";

/// Default exchange rate endpoint (USD base).
pub const DEFAULT_EXCHANGE_RATE_API_URL: &str = "https://open.er-api.com/v6/latest/USD";

pub const DB_PATH: &str = "./country_status.db";
pub const DEFAULT_PORT: u16 = 3000;

// Network operation timeouts
/// DNS pre-check timeout in seconds.
/// The pre-check is diagnostic only, so it is kept short.
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Upper bound for the per-request timeout
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Default User-Agent string for upstream requests.
pub const DEFAULT_USER_AGENT: &str = concat!("country_status/", env!("CARGO_PKG_VERSION"));

// Retry strategy
/// Delay in milliseconds between fetch attempts
pub const RETRY_DELAY_MS: u64 = 500;
/// Maximum number of fetch attempts (including initial attempt)
/// Set to 3 = initial attempt + 2 retries
pub const RETRY_MAX_ATTEMPTS: usize = 3;

// GDP estimation
/// Lower bound (inclusive) of the random GDP multiplier
pub const GDP_MULTIPLIER_MIN: u32 = 1000;
/// Upper bound (exclusive) of the random GDP multiplier
pub const GDP_MULTIPLIER_MAX: u32 = 2000;
/// Fractional digits kept for stored rates and GDP estimates
pub const DECIMAL_SCALE: u32 = 8;

// HTTP status codes that are worth retrying
pub const HTTP_STATUS_REQUEST_TIMEOUT: u16 = 408;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;
pub const HTTP_STATUS_BAD_GATEWAY: u16 = 502;
pub const HTTP_STATUS_SERVICE_UNAVAILABLE: u16 = 503;
pub const HTTP_STATUS_GATEWAY_TIMEOUT: u16 = 504;

/// Clamps a requested timeout into `[1, MAX_REQUEST_TIMEOUT_SECS]` seconds.
pub fn bounded_request_timeout(seconds: u64) -> Duration {
    Duration::from_secs(seconds.clamp(1, MAX_REQUEST_TIMEOUT_SECS))
}
