//! HTTP handlers.

mod countries;
mod status;

pub use countries::{delete_handler, get_handler, list_handler, refresh_handler};
pub use status::{not_found_handler, ping_handler, status_handler};
