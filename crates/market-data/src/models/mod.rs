//! Market data models
//!
//! This module contains the core data types for price resolution:
//! - `types` - Type aliases for common identifiers (ProviderId, Currency)
//! - `instrument` - The priced metals (Instrument)
//! - `price` - Normalized provider output (PricePayload) and unit conversions

mod instrument;
mod price;
mod types;

pub use instrument::Instrument;
pub use price::{unit_to_gram, PricePayload, GRAMS_PER_TROY_OUNCE, GRAM_PRICE_TOLERANCE};
pub use types::{Currency, ProviderId};
