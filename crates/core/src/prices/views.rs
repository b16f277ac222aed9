//! Response shapes handed to callers of the resolver.

use serde::Serialize;

use nisab_market_data::Diagnostic;

use super::errors::ResolutionError;
use super::nisab::per_gram;
use super::resolver::ResolvedPrice;

/// Successful price response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceView {
    /// Gram price when grams were requested, else the per-unit price.
    pub price: f64,
    pub price_per_unit: f64,
    pub price_per_gram: f64,
    pub currency: String,
    pub provider: String,
    pub cached: bool,
}

impl PriceView {
    pub fn new(resolved: &ResolvedPrice, want_grams: bool) -> Self {
        let payload = &resolved.payload;
        let price_per_gram = per_gram(payload);
        Self {
            price: if want_grams {
                price_per_gram
            } else {
                payload.price_per_unit
            },
            price_per_unit: payload.price_per_unit,
            price_per_gram,
            currency: payload.currency.clone(),
            provider: payload.provider_tag.clone(),
            cached: resolved.cached,
        }
    }
}

/// Structured failure response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureView {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Vec<Diagnostic>>,
}

impl From<ResolutionError> for FailureView {
    fn from(err: ResolutionError) -> Self {
        let error = err.to_string();
        match err {
            ResolutionError::Unavailable { diagnostics, .. } => Self { error, diagnostics },
        }
    }
}
