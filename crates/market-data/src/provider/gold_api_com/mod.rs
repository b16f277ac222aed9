//! gold-api.com provider.
//!
//! A keyless source that only quotes in USD. Prices in any other currency
//! are converted with a live USD exchange rate from open.er-api.com. When
//! that lookup fails the provider substitutes a hardcoded rate instead of
//! failing the attempt.
//!
//! The hardcoded rates are stale by construction; whether they should exist
//! at all is still waiting on product confirmation. Every use is logged at
//! `warn` so degraded prices are visible.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PricePayload};
use crate::provider::http::{build_client, fetch_json, normalize_base_url};
use crate::provider::{MetalPriceProvider, ProviderCapabilities};

/// Provider ID constant
pub const PROVIDER_ID: &str = "gold-api.com";

const DEFAULT_BASE_URL: &str = "https://api.gold-api.com";
const DEFAULT_FX_BASE_URL: &str = "https://open.er-api.com";

/// USD exchange rates used when the live FX lookup fails.
const FALLBACK_USD_RATES: &[(&str, f64)] = &[
    ("AED", 3.6725),
    ("CAD", 1.36),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("INR", 83.0),
    ("MYR", 4.7),
    ("PKR", 278.0),
    ("SAR", 3.75),
];

#[derive(Debug, Deserialize)]
struct SpotResponse {
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FxResponse {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Keyless USD spot provider with currency conversion.
pub struct GoldApiComProvider {
    client: Client,
    base_url: String,
    fx_base_url: String,
}

impl GoldApiComProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            base_url: DEFAULT_BASE_URL.to_string(),
            fx_base_url: DEFAULT_FX_BASE_URL.to_string(),
        }
    }

    /// Point the provider at different hosts (used by tests).
    pub fn with_base_urls(
        mut self,
        base_url: impl Into<String>,
        fx_base_url: impl Into<String>,
    ) -> Self {
        self.base_url = normalize_base_url(base_url);
        self.fx_base_url = normalize_base_url(fx_base_url);
        self
    }

    /// Hardcoded USD rate for a currency, if one is known.
    pub fn fallback_rate(currency: &str) -> Option<f64> {
        FALLBACK_USD_RATES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(currency))
            .map(|(_, rate)| *rate)
    }

    async fn live_usd_rate(&self, currency: &str) -> Result<f64, MarketDataError> {
        let request = self
            .client
            .get(format!("{}/v6/latest/USD", self.fx_base_url));
        let response: FxResponse = fetch_json(PROVIDER_ID, request).await?;

        if response.result != "success" {
            return Err(MarketDataError::Unavailable {
                provider: PROVIDER_ID.to_string(),
                message: format!("FX lookup returned '{}'", response.result),
            });
        }

        response
            .rates
            .get(&currency.to_ascii_uppercase())
            .copied()
            .filter(|r| r.is_finite() && *r > 0.0)
            .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, format!("no USD rate for {}", currency)))
    }

    /// USD → `currency` rate, degrading to the hardcoded table.
    async fn usd_rate(&self, currency: &str) -> Result<f64, MarketDataError> {
        if currency.eq_ignore_ascii_case("USD") {
            return Ok(1.0);
        }

        match self.live_usd_rate(currency).await {
            Ok(rate) => Ok(rate),
            Err(e) => match Self::fallback_rate(currency) {
                Some(rate) => {
                    warn!(
                        "FX lookup for USD/{} failed ({}); using hardcoded rate {}",
                        currency, e, rate
                    );
                    Ok(rate)
                }
                None => Err(e),
            },
        }
    }
}

#[async_trait]
impl MetalPriceProvider for GoldApiComProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            instruments: &[Instrument::Gold, Instrument::Silver],
            requires_credential: false,
        }
    }

    async fn fetch_price(
        &self,
        instrument: Instrument,
        currency: &str,
    ) -> Result<PricePayload, MarketDataError> {
        debug!("Fetching {} from {}", instrument.symbol(), PROVIDER_ID);

        let request = self
            .client
            .get(format!("{}/price/{}", self.base_url, instrument.symbol()));
        let spot: SpotResponse = fetch_json(PROVIDER_ID, request).await?;

        let usd_price = spot
            .price
            .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, "price missing"))?;
        if !usd_price.is_finite() || usd_price <= 0.0 {
            return Err(MarketDataError::parse(
                PROVIDER_ID,
                format!("invalid price {}", usd_price),
            ));
        }

        let rate = self.usd_rate(currency).await?;
        PricePayload::from_unit_price(instrument, usd_price * rate, currency, PROVIDER_ID)
    }
}
