// storage/mod.rs
// Database operations module

pub mod batch;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod status;

#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use batch::commit_batch;
pub use migrations::run_migrations;
pub use models::{BatchOutcome, CountryRecord, RefreshStatus};
pub use pool::init_db_pool_with_path;
pub use queries::{
    delete_country, get_country, list_countries, CountryQuery, SortDirection, SortField,
    SortOrder,
};
pub use status::get_status;
