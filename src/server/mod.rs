//! HTTP boundary.
//!
//! Routes:
//! - `POST /countries/refresh` - fetch, reconcile and commit a snapshot
//! - `GET /countries` - list with `region`, `currency` and `sort` filters
//! - `GET /countries/:name`, `DELETE /countries/:name`
//! - `GET /status` - aggregate refresh status
//! - `GET /ping` - liveness
//!
//! Service errors are mapped onto status codes by their `ErrorKind`.

mod handlers;
mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::service::CountryService;
use handlers::{
    delete_handler, get_handler, list_handler, not_found_handler, ping_handler, refresh_handler,
    status_handler,
};
pub use types::{status_for, ApiError, AppState};

/// Builds the router over `service`.
pub fn router(service: Arc<CountryService>) -> Router {
    Router::new()
        .route("/countries/refresh", post(refresh_handler))
        .route("/countries", get(list_handler))
        .route("/countries/:name", get(get_handler).delete(delete_handler))
        .route("/status", get(status_handler))
        .route("/ping", get(ping_handler))
        .fallback(not_found_handler)
        .with_state(AppState { service })
}

/// Serves on an already bound listener until the process is stopped.
pub async fn serve(listener: TcpListener, service: Arc<CountryService>) -> anyhow::Result<()> {
    axum::serve(listener, router(service))
        .await
        .context("HTTP server error")
}

/// Binds `0.0.0.0:port` and serves.
pub async fn run_server(port: u16, service: Arc<CountryService>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind HTTP server to port {port}"))?;

    log::info!("Server listening on http://0.0.0.0:{port}/");
    log::info!("  - Refresh: POST http://0.0.0.0:{port}/countries/refresh");
    log::info!("  - Status: http://0.0.0.0:{port}/status");

    serve(listener, service).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_server_port_in_use_fails() {
        let taken = TcpListener::bind(("0.0.0.0", 0))
            .await
            .expect("Failed to bind");
        let port = taken.local_addr().expect("local addr").port();

        let pool = crate::storage::test_helpers::create_test_pool().await;
        let service = Arc::new(CountryService::new(
            Arc::new(pool),
            crate::fetch::Fetcher::new(
                Arc::new(reqwest::Client::new()),
                None,
                crate::error_handling::RetryPolicy::default(),
            ),
            crate::service::SourceUrls {
                countries: "http://127.0.0.1:1/all".into(),
                rates: "http://127.0.0.1:1/rates".into(),
            },
            Box::new(crate::reconcile::FixedMultiplier(rust_decimal::Decimal::from(1000))),
        ));

        let err = run_server(port, service)
            .await
            .expect_err("port is already bound");
        assert!(err.to_string().contains(&port.to_string()));
    }
}
