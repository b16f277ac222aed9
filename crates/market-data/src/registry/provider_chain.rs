//! Provider chain: the ordered waterfall of price providers.
//!
//! The chain walks providers strictly in priority order and stops at the
//! first usable payload. Providers are never raced; attribution and
//! diagnostic order are therefore deterministic.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};

use super::{FetchDiagnostics, PriceValidator, SkipReason};
use crate::errors::{ChainError, MarketDataError, RetryClass};
use crate::models::{Currency, Instrument, PricePayload, ProviderId};
use crate::provider::MetalPriceProvider;

/// Ordered, deduplicated sequence of price providers for one currency.
pub struct ProviderChain {
    providers: Vec<Arc<dyn MetalPriceProvider>>,
    currency: Currency,
    validator: PriceValidator,
}

impl ProviderChain {
    /// Create a chain ordered by each provider's default priority.
    ///
    /// # Arguments
    ///
    /// * `providers` - Price providers, in any order
    /// * `currency` - The fixed target currency every lookup is made in
    pub fn new(providers: Vec<Arc<dyn MetalPriceProvider>>, currency: impl Into<Currency>) -> Self {
        Self::with_priorities(providers, currency, HashMap::new())
    }

    /// Create a chain with custom priorities.
    ///
    /// # Arguments
    ///
    /// * `providers` - Price providers, in any order
    /// * `currency` - The fixed target currency
    /// * `custom_priorities` - Configured priorities (provider_id -> priority).
    ///   Lower values = higher priority. Providers without an entry fall back
    ///   to their own `priority()`.
    pub fn with_priorities(
        mut providers: Vec<Arc<dyn MetalPriceProvider>>,
        currency: impl Into<Currency>,
        custom_priorities: HashMap<String, i32>,
    ) -> Self {
        // Stable sort: providers with equal priority keep their given order.
        providers.sort_by_key(|p| {
            custom_priorities
                .get(p.id())
                .copied()
                .unwrap_or_else(|| p.priority() as i32)
        });

        let mut seen = HashSet::new();
        providers.retain(|p| {
            let fresh = seen.insert(p.id());
            if !fresh {
                debug!("Dropping duplicate provider '{}' from chain", p.id());
            }
            fresh
        });

        Self {
            providers,
            currency: currency.into(),
            validator: PriceValidator::new(),
        }
    }

    /// The fixed currency this chain quotes in.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Get the providers in traversal order.
    pub fn providers(&self) -> &[Arc<dyn MetalPriceProvider>] {
        &self.providers
    }

    /// Provider ids in traversal order.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Resolve a price by trying each provider in order.
    ///
    /// Every skip or failure advances to the next provider. When
    /// `collect_diagnostics` is false nothing is retained about failed
    /// steps; otherwise the returned error carries one entry per
    /// non-successful step.
    pub async fn resolve(
        &self,
        instrument: Instrument,
        collect_diagnostics: bool,
    ) -> Result<PricePayload, ChainError> {
        let mut diagnostics = collect_diagnostics.then(FetchDiagnostics::new);

        for provider in &self.providers {
            let provider_id: ProviderId = Cow::Borrowed(provider.id());

            if !provider.capabilities().supports(instrument) {
                debug!("Provider '{}' does not price {}, skipping", provider_id, instrument);
                if let Some(d) = diagnostics.as_mut() {
                    d.record_skip(provider_id, SkipReason::InstrumentNotSupported);
                }
                continue;
            }

            debug!("Fetching {} from provider '{}'", instrument, provider_id);

            let outcome = match provider.fetch_price(instrument, &self.currency).await {
                Ok(payload) => self
                    .validator
                    .validate(&payload, instrument, &self.currency)
                    .map(|()| payload),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(payload) => {
                    info!(
                        "Resolved {} from '{}' ({} {}/oz)",
                        instrument, payload.provider_tag, payload.price_per_unit, payload.currency
                    );
                    return Ok(payload);
                }
                Err(e) => {
                    match e.retry_class() {
                        RetryClass::Skip => {
                            debug!("Provider '{}' skipped: {}", provider_id, e);
                        }
                        RetryClass::NextProvider => {
                            debug!(
                                "Provider '{}' failed with {}, trying next provider",
                                provider_id, e
                            );
                        }
                    }
                    if let Some(d) = diagnostics.as_mut() {
                        record_failure(d, provider_id, &e);
                    }
                }
            }
        }

        match &diagnostics {
            Some(d) => warn!("All providers failed for {}. Diagnostics: {}", instrument, d.summary()),
            None => warn!("All providers failed for {}", instrument),
        }

        Err(ChainError::Exhausted { diagnostics })
    }
}

fn record_failure(diagnostics: &mut FetchDiagnostics, provider_id: ProviderId, error: &MarketDataError) {
    match error {
        MarketDataError::CredentialMissing { .. } => {
            diagnostics.record_skip(provider_id, SkipReason::CredentialMissing)
        }
        MarketDataError::UnsupportedInstrument(_) => {
            diagnostics.record_skip(provider_id, SkipReason::InstrumentNotSupported)
        }
        other => diagnostics.record_error(provider_id, other.to_string()),
    }
}
