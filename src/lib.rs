//! country_status library: reconciled country snapshots
//!
//! This library fetches a country directory and a currency rate table,
//! reconciles them into country records with an estimated GDP, and commits
//! each refresh to SQLite as one atomic snapshot. An axum server exposes the
//! snapshot over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use country_status::{build_service, Config, CountryQuery};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("countries.db"),
//!     ..Default::default()
//! };
//!
//! let service = build_service(&config).await?;
//! let summary = service.refresh().await?;
//! println!("{} countries as of {}", summary.total_countries, summary.refreshed_at);
//!
//! for country in service.list(&CountryQuery::default()).await? {
//!     println!("{}: {:?}", country.name, country.estimated_gdp);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod error_handling;
pub mod fetch;
pub mod initialization;
pub mod reconcile;
pub mod server;
pub mod service;
pub mod storage;

// Re-export public API
pub use config::{Cli, Command, Config, LogFormat, LogLevel};
pub use error_handling::{ErrorKind, ServiceError};
pub use service::{build_service, CountryService, RefreshSummary, SourceUrls};
pub use storage::{CountryQuery, CountryRecord, RefreshStatus, SortDirection, SortField, SortOrder};
