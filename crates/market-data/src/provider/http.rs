//! Shared HTTP plumbing for provider adapters.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::errors::MarketDataError;

/// Default HTTP request timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send a request and decode a JSON body.
///
/// Transport failures and non-success statuses become `Unavailable`;
/// a success status with an undecodable body becomes `ParseError`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    provider: &str,
    request: RequestBuilder,
) -> Result<T, MarketDataError> {
    let response = request
        .send()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(MarketDataError::Unavailable {
            provider: provider.to_string(),
            message: format!("HTTP {}", status),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    serde_json::from_slice(&body).map_err(|e| MarketDataError::parse(provider, e.to_string()))
}

/// Trim a configured base URL so paths can be appended with `/`.
pub(crate) fn normalize_base_url(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}
