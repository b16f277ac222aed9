//! Price payload validation.
//!
//! Re-checks adapter output before the chain accepts it:
//! - positive, finite prices
//! - unit/gram agreement
//! - the payload is for the instrument and currency that were requested

use log::warn;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PricePayload};

/// Validator for adapter payloads.
#[derive(Clone, Debug, Default)]
pub struct PriceValidator;

impl PriceValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a payload against the request that produced it.
    ///
    /// Failures are reported as `ParseError` so the chain advances.
    pub fn validate(
        &self,
        payload: &PricePayload,
        instrument: Instrument,
        currency: &str,
    ) -> Result<(), MarketDataError> {
        if payload.instrument != instrument {
            return Err(MarketDataError::parse(
                &payload.provider_tag,
                format!("expected {} but got {}", instrument, payload.instrument),
            ));
        }

        if !payload.currency.eq_ignore_ascii_case(currency) {
            return Err(MarketDataError::parse(
                &payload.provider_tag,
                format!("expected {} but got {}", currency, payload.currency),
            ));
        }

        payload.check_consistency().inspect_err(|e| {
            warn!("Rejected payload from {}: {}", payload.provider_tag, e);
        })
    }
}
