use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::instrument::Instrument;
use crate::errors::MarketDataError;

/// Grams in one troy ounce, the canonical per-unit basis.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1034768;

/// Maximum relative disagreement between a provider-supplied gram price
/// and the one derived from its unit price.
pub const GRAM_PRICE_TOLERANCE: f64 = 0.005;

/// Normalized spot price produced by a provider adapter.
///
/// Payloads are immutable once built: callers that need a different tag
/// (e.g. the snapshot fallback) get a new value from [`PricePayload::retagged`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePayload {
    pub instrument: Instrument,

    /// Price of one troy ounce
    pub price_per_unit: f64,

    /// Price of one gram
    pub price_per_gram: f64,

    /// Quote currency (ISO 4217)
    pub currency: String,

    /// Source of the price, including the credential slot when relevant
    /// (e.g. "goldapi.io#2")
    pub provider_tag: String,

    /// True when the upstream returned the gram price itself
    #[serde(default)]
    pub gram_price_supplied: bool,

    pub fetched_at: DateTime<Utc>,
}

impl PricePayload {
    /// Build a payload from a per-ounce price, deriving the gram price.
    pub fn from_unit_price(
        instrument: Instrument,
        price_per_unit: f64,
        currency: impl Into<String>,
        provider_tag: impl Into<String>,
    ) -> Result<Self, MarketDataError> {
        let provider_tag = provider_tag.into();
        check_price(&provider_tag, "price_per_unit", price_per_unit)?;

        Ok(Self {
            instrument,
            price_per_unit,
            price_per_gram: unit_to_gram(price_per_unit),
            currency: currency.into(),
            provider_tag,
            gram_price_supplied: false,
            fetched_at: Utc::now(),
        })
    }

    /// Build a payload from a provider that quotes both units directly.
    ///
    /// Both prices must be positive and agree within [`GRAM_PRICE_TOLERANCE`].
    pub fn with_gram_price(
        instrument: Instrument,
        price_per_unit: f64,
        price_per_gram: f64,
        currency: impl Into<String>,
        provider_tag: impl Into<String>,
    ) -> Result<Self, MarketDataError> {
        let provider_tag = provider_tag.into();
        check_price(&provider_tag, "price_per_unit", price_per_unit)?;
        check_price(&provider_tag, "price_per_gram", price_per_gram)?;

        let payload = Self {
            instrument,
            price_per_unit,
            price_per_gram,
            currency: currency.into(),
            provider_tag,
            gram_price_supplied: true,
            fetched_at: Utc::now(),
        };
        payload.check_consistency()?;
        Ok(payload)
    }

    /// Copy of this payload attributed to a different source.
    pub fn retagged(&self, provider_tag: impl Into<String>) -> Self {
        Self {
            provider_tag: provider_tag.into(),
            ..self.clone()
        }
    }

    /// Copy of this payload with an explicit observation time.
    pub fn observed_at(self, fetched_at: DateTime<Utc>) -> Self {
        Self { fetched_at, ..self }
    }

    /// Verify the unit/gram invariant.
    pub fn check_consistency(&self) -> Result<(), MarketDataError> {
        check_price(&self.provider_tag, "price_per_unit", self.price_per_unit)?;
        check_price(&self.provider_tag, "price_per_gram", self.price_per_gram)?;

        let derived = unit_to_gram(self.price_per_unit);
        let drift = (self.price_per_gram - derived).abs() / derived;
        if drift > GRAM_PRICE_TOLERANCE {
            return Err(MarketDataError::ParseError {
                provider: self.provider_tag.clone(),
                message: format!(
                    "gram price {} disagrees with unit price {} (expected ~{:.4})",
                    self.price_per_gram, self.price_per_unit, derived
                ),
            });
        }
        Ok(())
    }
}

/// Convert a per-troy-ounce price to a per-gram price.
pub fn unit_to_gram(price_per_unit: f64) -> f64 {
    price_per_unit / GRAMS_PER_TROY_OUNCE
}

fn check_price(provider: &str, field: &str, value: f64) -> Result<(), MarketDataError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(MarketDataError::ParseError {
            provider: provider.to_string(),
            message: format!("{} must be a positive finite number, got {}", field, value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unit_price_derives_gram_price() {
        let payload =
            PricePayload::from_unit_price(Instrument::Gold, 6274.64, "USD", "metalpriceapi")
                .unwrap();
        assert!((payload.price_per_gram - 201.7344).abs() < 1e-3);
        assert!(!payload.gram_price_supplied);
        assert_eq!(payload.provider_tag, "metalpriceapi");
    }

    #[test]
    fn test_rejects_non_positive_and_non_finite() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = PricePayload::from_unit_price(Instrument::Gold, bad, "USD", "TEST")
                .unwrap_err();
            assert!(matches!(err, MarketDataError::ParseError { .. }));
        }
    }

    #[test]
    fn test_supplied_gram_price_must_agree() {
        let ok = PricePayload::with_gram_price(Instrument::Gold, 2000.0, 64.30, "USD", "TEST");
        assert!(ok.unwrap().gram_price_supplied);

        let err = PricePayload::with_gram_price(Instrument::Gold, 2000.0, 70.0, "USD", "TEST")
            .unwrap_err();
        assert!(matches!(err, MarketDataError::ParseError { .. }));
    }

    #[test]
    fn test_retagged_keeps_prices() {
        let payload =
            PricePayload::from_unit_price(Instrument::Silver, 30.0, "USD", "goldapi.io").unwrap();
        let tagged = payload.retagged("monthly-fallback");
        assert_eq!(tagged.provider_tag, "monthly-fallback");
        assert_eq!(tagged.price_per_unit, payload.price_per_unit);
        assert_eq!(tagged.fetched_at, payload.fetched_at);
        assert_eq!(payload.provider_tag, "goldapi.io");
    }
}
