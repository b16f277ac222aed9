//! Price service constants.

use std::time::Duration;

/// Provider identifiers accepted in configuration
pub const PROVIDER_GOLD_API_IO: &str = "goldapi.io";
pub const PROVIDER_METAL_PRICE_API: &str = "metalpriceapi";
pub const PROVIDER_GOLD_API_COM: &str = "gold-api.com";

/// Default provider waterfall, highest priority first.
pub const DEFAULT_PROVIDER_ORDER: &[&str] = &[
    PROVIDER_GOLD_API_IO,
    PROVIDER_METAL_PRICE_API,
    PROVIDER_GOLD_API_COM,
];

/// Default target currency
pub const DEFAULT_CURRENCY: &str = "USD";

/// Lifetime of a cached resolution.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Provider tag carried by prices served from the snapshot store.
pub const MONTHLY_FALLBACK_TAG: &str = "monthly-fallback";

/// Grams of gold that make up the Nisab threshold.
pub const NISAB_GOLD_GRAMS: f64 = 85.0;
