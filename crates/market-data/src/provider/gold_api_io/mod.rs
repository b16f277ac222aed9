//! GoldAPI.io provider.
//!
//! Quotes both the per-ounce and the 24k per-gram price. The free tier is
//! rate limited per key, so deployments usually configure several keys;
//! they are tried in the configured order and the first one that yields a
//! usable price wins.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PricePayload};
use crate::provider::http::{build_client, fetch_json, normalize_base_url};
use crate::provider::{MetalPriceProvider, ProviderCapabilities};

/// Provider ID constant
pub const PROVIDER_ID: &str = "goldapi.io";

const DEFAULT_BASE_URL: &str = "https://www.goldapi.io";

#[derive(Debug, Deserialize)]
struct GoldApiResponse {
    price: Option<f64>,
    price_gram_24k: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

/// GoldAPI.io provider with an ordered list of API keys.
pub struct GoldApiIoProvider {
    client: Client,
    api_keys: Vec<String>,
    base_url: String,
}

impl GoldApiIoProvider {
    /// Create a provider. Blank keys are dropped.
    pub fn new(api_keys: Vec<String>, timeout: Duration) -> Self {
        let api_keys = api_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            client: build_client(timeout),
            api_keys,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    /// Tag naming the key slot when more than one key is configured.
    fn tag_for(&self, index: usize) -> String {
        if self.api_keys.len() > 1 {
            format!("{}#{}", PROVIDER_ID, index + 1)
        } else {
            PROVIDER_ID.to_string()
        }
    }

    async fn fetch_with_key(
        &self,
        api_key: &str,
        tag: String,
        instrument: Instrument,
        currency: &str,
    ) -> Result<PricePayload, MarketDataError> {
        let request = self
            .client
            .get(format!(
                "{}/api/{}/{}",
                self.base_url,
                instrument.symbol(),
                currency
            ))
            .header("x-access-token", api_key);

        let response: GoldApiResponse = fetch_json(PROVIDER_ID, request).await?;

        if let Some(error) = response.error {
            return Err(MarketDataError::Unavailable {
                provider: tag,
                message: error,
            });
        }

        let price = response
            .price
            .ok_or_else(|| MarketDataError::parse(&tag, "price missing"))?;

        match response.price_gram_24k {
            Some(gram) => PricePayload::with_gram_price(instrument, price, gram, currency, tag),
            None => PricePayload::from_unit_price(instrument, price, currency, tag),
        }
    }
}

#[async_trait]
impl MetalPriceProvider for GoldApiIoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
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
        if self.api_keys.is_empty() {
            return Err(MarketDataError::CredentialMissing {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let mut last_error: Option<MarketDataError> = None;

        for (index, api_key) in self.api_keys.iter().enumerate() {
            let tag = self.tag_for(index);
            match self
                .fetch_with_key(api_key, tag.clone(), instrument, currency)
                .await
            {
                Ok(payload) => return Ok(payload),
                Err(e) => {
                    debug!("{} failed for {}: {}", tag, instrument, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| MarketDataError::CredentialMissing {
            provider: PROVIDER_ID.to_string(),
        }))
    }
}
