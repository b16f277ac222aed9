//! Metal Price API provider for precious metals spot prices.
//!
//! This provider fetches real-time prices from metalpriceapi.com. The API
//! quotes how many troy ounces one unit of the base currency buys, so the
//! per-ounce price is the reciprocal of the returned rate.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PricePayload};
use crate::provider::http::{build_client, fetch_json, normalize_base_url};
use crate::provider::{MetalPriceProvider, ProviderCapabilities};

/// Provider ID constant
pub const PROVIDER_ID: &str = "metalpriceapi";

const DEFAULT_BASE_URL: &str = "https://api.metalpriceapi.com";

/// API response from Metal Price API
#[derive(Debug, Deserialize)]
struct MetalPriceResponse {
    /// Whether the request was successful
    success: bool,
    /// Rates for requested metals (1 base_currency = rate troy ounces)
    #[serde(default)]
    rates: HashMap<String, f64>,
    /// Error detail when `success` is false
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Metal Price API provider.
///
/// # Example
///
/// ```ignore
/// use nisab_market_data::provider::metal_price_api::MetalPriceApiProvider;
///
/// let provider = MetalPriceApiProvider::new(Some("your_api_key".to_string()), timeout);
/// ```
pub struct MetalPriceApiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl MetalPriceApiProvider {
    /// Create a new Metal Price API provider with the given API key.
    pub fn new(api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    fn parse(
        response: MetalPriceResponse,
        instrument: Instrument,
        currency: &str,
    ) -> Result<PricePayload, MarketDataError> {
        if !response.success {
            let detail = response
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "API request failed".to_string());
            return Err(MarketDataError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                message: detail,
            });
        }

        let symbol = instrument.symbol();
        let rate = response.rates.get(symbol).copied().ok_or_else(|| {
            MarketDataError::parse(PROVIDER_ID, format!("rate for {} missing", symbol))
        })?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(MarketDataError::parse(
                PROVIDER_ID,
                format!("invalid rate {}", rate),
            ));
        }

        // Price per troy ounce = 1 / rate
        PricePayload::from_unit_price(instrument, 1.0 / rate, currency, PROVIDER_ID)
    }
}

#[async_trait]
impl MetalPriceProvider for MetalPriceApiProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            instruments: &[Instrument::Gold, Instrument::Silver],
            requires_credential: true,
        }
    }

    async fn fetch_price(
        &self,
        instrument: Instrument,
        currency: &str,
    ) -> Result<PricePayload, MarketDataError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| MarketDataError::CredentialMissing {
                provider: PROVIDER_ID.to_string(),
            })?;

        debug!("Fetching {} from {}", instrument.symbol(), PROVIDER_ID);

        let request = self
            .client
            .get(format!("{}/v1/latest", self.base_url))
            .query(&[
                ("api_key", api_key),
                ("base", currency),
                ("currencies", instrument.symbol()),
            ]);

        let response: MetalPriceResponse = fetch_json(PROVIDER_ID, request).await?;
        Self::parse(response, instrument, currency)
    }
}
