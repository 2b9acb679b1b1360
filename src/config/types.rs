//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    bounded_request_timeout, DB_PATH, DEFAULT_COUNTRIES_API_URL, DEFAULT_EXCHANGE_RATE_API_URL,
    DEFAULT_PORT, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT, RETRY_DELAY_MS,
    RETRY_MAX_ATTEMPTS,
};
use crate::error_handling::RetryPolicy;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use country_status::Config;
///
/// let config = Config {
///     rates_url: "http://localhost:8080/rates".to_string(),
///     retry_attempts: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Country directory endpoint
    pub countries_url: String,

    /// Exchange rate endpoint
    pub rates_url: String,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Per-request timeout in seconds (clamped when the client is built)
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Total fetch attempts per endpoint, including the first one
    pub retry_attempts: usize,

    /// Delay between fetch attempts in milliseconds
    pub retry_delay_ms: u64,

    /// Resolve upstream hostnames before fetching (diagnostic only)
    pub dns_precheck: bool,

    /// Seed for the GDP multiplier; `None` draws from OS entropy
    pub seed: Option<u64>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Retry policy shared by both upstream fetches.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }

    /// Per-request timeout after clamping.
    pub fn request_timeout(&self) -> Duration {
        bounded_request_timeout(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            countries_url: DEFAULT_COUNTRIES_API_URL.to_string(),
            rates_url: DEFAULT_EXCHANGE_RATE_API_URL.to_string(),
            db_path: PathBuf::from(DB_PATH),
            timeout_seconds: DEFAULT_REQUEST_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_attempts: RETRY_MAX_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            dns_precheck: true,
            seed: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

/// Command-line interface.
///
/// # Examples
///
/// ```bash
/// # Serve the HTTP API on port 8080
/// country_status serve --port 8080
///
/// # Refresh once from the command line and exit
/// country_status refresh --db-path ./countries.db
///
/// # List African countries by estimated GDP
/// country_status list --region Africa --sort gdp_desc
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "country_status",
    about = "Reconciles country data with exchange rates and caches the snapshot in SQLite."
)]
pub struct Cli {
    #[command(flatten)]
    pub opt: Opt,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the CLI.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },
    /// Fetch both sources and commit a fresh snapshot
    Refresh,
    /// Print the aggregate refresh status
    Status,
    /// List stored countries
    List {
        /// Only countries in this region (exact match)
        #[arg(long)]
        region: Option<String>,
        /// Only countries using this currency code (exact match)
        #[arg(long)]
        currency: Option<String>,
        /// gdp_desc|gdp_asc|name_asc|name_desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show one country by name (case-sensitive)
    Get { name: String },
    /// Delete one country by name (case-sensitive)
    Delete { name: String },
}

/// Options shared by every subcommand.
///
/// This struct is automatically generated by `clap` from the field attributes.
#[derive(Debug, Args)]
pub struct Opt {
    /// Country directory endpoint
    #[arg(long, global = true, env = "COUNTRIES_API_URL", default_value = DEFAULT_COUNTRIES_API_URL)]
    pub countries_url: String,

    /// Exchange rate endpoint
    #[arg(long, global = true, env = "EXCHANGE_RATE_API_URL", default_value = DEFAULT_EXCHANGE_RATE_API_URL)]
    pub rates_url: String,

    /// Database path (SQLite file)
    #[arg(long, global = true, env = "COUNTRY_STATUS_DB_PATH", value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Per-request timeout in seconds (1-60)
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Total fetch attempts per endpoint
    #[arg(long, global = true, default_value_t = RETRY_MAX_ATTEMPTS)]
    pub retry_attempts: usize,

    /// Delay between fetch attempts in milliseconds
    #[arg(long, global = true, default_value_t = RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    /// Skip resolving upstream hostnames before fetching
    #[arg(long, global = true)]
    pub no_dns_precheck: bool,

    /// Seed for the GDP multiplier (reproducible estimates)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            countries_url: opt.countries_url,
            rates_url: opt.rates_url,
            db_path: opt.db_path,
            timeout_seconds: opt.timeout_seconds,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_attempts: opt.retry_attempts,
            retry_delay_ms: opt.retry_delay_ms,
            dns_precheck: !opt.no_dns_precheck,
            seed: opt.seed,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.countries_url, DEFAULT_COUNTRIES_API_URL);
        assert_eq!(config.rates_url, DEFAULT_EXCHANGE_RATE_API_URL);
        assert_eq!(config.db_path, PathBuf::from("./country_status.db"));
        assert_eq!(config.timeout_seconds, 10);
        assert_eq!(config.retry_attempts, 3);
        assert!(config.dns_precheck);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_config_retry_policy() {
        let config = Config {
            retry_attempts: 4,
            retry_delay_ms: 25,
            ..Default::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts(), 4);
        assert_eq!(policy.delay(), Duration::from_millis(25));
    }

    #[test]
    fn test_cli_parses_refresh_with_overrides() {
        let cli = Cli::try_parse_from([
            "country_status",
            "refresh",
            "--rates-url",
            "http://127.0.0.1:9/rates",
            "--no-dns-precheck",
            "--seed",
            "7",
        ])
        .expect("CLI should parse");
        assert!(matches!(cli.command, Command::Refresh));

        let config = Config::from(cli.opt);
        assert_eq!(config.rates_url, "http://127.0.0.1:9/rates");
        assert!(!config.dns_precheck);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_cli_parses_list_filters() {
        let cli = Cli::try_parse_from([
            "country_status",
            "list",
            "--region",
            "Africa",
            "--sort",
            "gdp_desc",
        ])
        .expect("CLI should parse");
        match cli.command {
            Command::List {
                region,
                currency,
                sort,
            } => {
                assert_eq!(region.as_deref(), Some("Africa"));
                assert!(currency.is_none());
                assert_eq!(sort.as_deref(), Some("gdp_desc"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
