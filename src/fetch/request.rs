//! JSON GET with bounded retries.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use tokio_retry::RetryIf;

use crate::error_handling::{categorize_reqwest_error, NetworkError, RetryPolicy};

/// Performs a single GET and decodes the body as `T`.
///
/// Non-2xx responses become `NetworkError::Status`; a body that is not valid
/// JSON for `T` becomes `NetworkError::Decode`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, NetworkError> {
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| categorize_reqwest_error(url, &e))?;

    let response = response
        .error_for_status()
        .map_err(|e| categorize_reqwest_error(url, &e))?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| categorize_reqwest_error(url, &e))?;

    serde_json::from_slice(&bytes).map_err(|e| NetworkError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Runs `get_json` under `policy`, retrying only transient failures.
///
/// Returns the last error once the attempt budget is exhausted.
pub(crate) async fn get_json_with_retry<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T, NetworkError> {
    let counter = AtomicUsize::new(0);
    let attempt = &counter;
    let max_attempts = policy.max_attempts();

    RetryIf::spawn(
        policy.strategy(),
        move || async move {
            let n = attempt.fetch_add(1, Ordering::Relaxed) + 1;
            debug!("GET {url} (attempt {n}/{max_attempts})");
            let result = get_json::<T>(client, url).await;
            if let Err(e) = &result {
                if e.is_transient() && n < max_attempts {
                    warn!("Attempt {n}/{max_attempts} for {url} failed, retrying: {e}");
                } else {
                    warn!("Attempt {n}/{max_attempts} for {url} failed: {e}");
                }
            }
            result
        },
        |e: &NetworkError| e.is_transient(),
    )
    .await
}
