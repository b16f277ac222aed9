//! Provider chain factory.
//!
//! Turns configured provider ids into a prioritized [`ProviderChain`].
//! Keyed providers are always built, even without a key, so that a missing
//! credential shows up as a skip in the chain's diagnostics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};

use nisab_market_data::{
    GoldApiComProvider, GoldApiIoProvider, MetalPriceApiProvider, MetalPriceProvider,
    ProviderChain, DEFAULT_REQUEST_TIMEOUT,
};

use crate::constants::{
    DEFAULT_CURRENCY, DEFAULT_PROVIDER_ORDER, PROVIDER_GOLD_API_COM, PROVIDER_GOLD_API_IO,
    PROVIDER_METAL_PRICE_API,
};

/// Inputs for building the provider chain.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Provider ids in priority order.
    pub enabled: Vec<String>,
    pub goldapi_keys: Vec<String>,
    pub metalpriceapi_key: Option<String>,
    pub currency: String,
    pub request_timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_PROVIDER_ORDER.iter().map(|s| s.to_string()).collect(),
            goldapi_keys: Vec::new(),
            metalpriceapi_key: None,
            currency: DEFAULT_CURRENCY.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Build the chain. Priorities follow the order of `settings.enabled`;
/// unknown ids are logged and ignored, repeated ids collapse to one.
pub fn build_provider_chain(settings: &ProviderSettings) -> ProviderChain {
    let mut providers: Vec<Arc<dyn MetalPriceProvider>> = Vec::new();
    let mut custom_priorities: HashMap<String, i32> = HashMap::new();

    for (position, id) in settings.enabled.iter().enumerate() {
        let id = id.trim();
        match create_provider(id, settings) {
            Some(provider) => {
                custom_priorities
                    .entry(provider.id().to_string())
                    .or_insert(position as i32);
                providers.push(provider);
            }
            None => warn!("Unknown provider ID: {}", id),
        }
    }

    let chain = ProviderChain::with_priorities(providers, settings.currency.clone(), custom_priorities);

    if chain.providers().is_empty() {
        warn!("No price providers configured! Enabled: {:?}", settings.enabled);
    } else {
        info!(
            "Price chain initialized for {} with providers: {:?}",
            chain.currency(),
            chain.provider_ids()
        );
    }

    chain
}

fn create_provider(id: &str, settings: &ProviderSettings) -> Option<Arc<dyn MetalPriceProvider>> {
    let timeout = settings.request_timeout;
    match id {
        PROVIDER_GOLD_API_IO => Some(Arc::new(GoldApiIoProvider::new(
            settings.goldapi_keys.clone(),
            timeout,
        ))),
        PROVIDER_METAL_PRICE_API => Some(Arc::new(MetalPriceApiProvider::new(
            settings.metalpriceapi_key.clone(),
            timeout,
        ))),
        PROVIDER_GOLD_API_COM => Some(Arc::new(GoldApiComProvider::new(timeout))),
        _ => None,
    }
}
