//! Nisab threshold derived from the gold price.

use serde::Serialize;

use nisab_market_data::{unit_to_gram, PricePayload};

use crate::constants::NISAB_GOLD_GRAMS;

/// Gram price of a payload.
///
/// Uses the provider's own gram quote when it supplied one, otherwise
/// converts the per-ounce price.
pub fn per_gram(payload: &PricePayload) -> f64 {
    if payload.gram_price_supplied {
        payload.price_per_gram
    } else {
        unit_to_gram(payload.price_per_unit)
    }
}

/// Nisab value for a gold gram price.
pub fn nisab(gold_per_gram: f64) -> f64 {
    gold_per_gram * NISAB_GOLD_GRAMS
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NisabValue {
    pub nisab: f64,
    pub gold_price_per_gram: f64,
    pub nisab_grams: f64,
    pub currency: String,
    pub provider: String,
    pub cached: bool,
}

impl NisabValue {
    pub fn from_gold(payload: &PricePayload, cached: bool) -> Self {
        let gold_price_per_gram = per_gram(payload);
        Self {
            nisab: nisab(gold_price_per_gram),
            gold_price_per_gram,
            nisab_grams: NISAB_GOLD_GRAMS,
            currency: payload.currency.clone(),
            provider: payload.provider_tag.clone(),
            cached,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nisab_market_data::Instrument;

    #[test]
    fn test_nisab_from_ounce_price() {
        let payload = PricePayload::from_unit_price(Instrument::Gold, 6274.64, "USD", "T").unwrap();
        let gram = per_gram(&payload);
        assert!((gram - 201.7344).abs() < 1e-3);
        assert!((nisab(gram) - 17147.42).abs() < 0.05);
    }

    #[test]
    fn test_supplied_gram_price_wins() {
        let payload =
            PricePayload::with_gram_price(Instrument::Gold, 2000.0, 64.5, "USD", "T").unwrap();
        assert_eq!(per_gram(&payload), 64.5);

        let value = NisabValue::from_gold(&payload, true);
        assert_eq!(value.nisab, 64.5 * 85.0);
        assert_eq!(value.nisab_grams, 85.0);
        assert!(value.cached);
        assert_eq!(value.provider, "T");
    }
}
