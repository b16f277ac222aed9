//! Provider capabilities.
//!
//! Describes what a price provider can quote so the chain can skip it
//! without making a network call.

use crate::models::Instrument;

/// Describes the capabilities of a price provider.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Instruments this provider can price.
    pub instruments: &'static [Instrument],

    /// Whether at least one credential is needed to make a request.
    pub requires_credential: bool,
}

impl ProviderCapabilities {
    /// Check whether the provider prices the given instrument.
    pub fn supports(&self, instrument: Instrument) -> bool {
        self.instruments.contains(&instrument)
    }
}
