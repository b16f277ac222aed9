//! Price provider trait definitions.
//!
//! This module defines the core `MetalPriceProvider` trait that every
//! upstream adapter implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Instrument, PricePayload};

use super::capabilities::ProviderCapabilities;

/// Trait for spot price providers.
///
/// Implement this trait to add a new upstream quote source. The chain orders
/// providers by [`priority`](Self::priority) and treats every returned error
/// as non-fatal, so adding or removing a provider never changes control flow.
///
/// # Contract
///
/// - Return [`MarketDataError::CredentialMissing`] before any network call
///   when a required credential is absent.
/// - Return [`MarketDataError::Unavailable`] for transport errors, timeouts
///   and non-success statuses.
/// - Return [`MarketDataError::ParseError`] for success responses that lack
///   usable numbers.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use nisab_market_data::provider::{MetalPriceProvider, ProviderCapabilities};
///
/// struct MyProvider {
///     api_key: Option<String>,
/// }
///
/// #[async_trait]
/// impl MetalPriceProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "my-provider"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             instruments: &[Instrument::Gold],
///             requires_credential: true,
///         }
///     }
///
///     // ... implement fetch_price
/// }
/// ```
#[async_trait]
pub trait MetalPriceProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Used for logging, diagnostics and deduplication inside the chain.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Describes what this provider can do.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Fetch the current spot price for an instrument in `currency`.
    ///
    /// Providers with several credentials try them in order and return the
    /// first success; the caller only sees the final outcome.
    async fn fetch_price(
        &self,
        instrument: Instrument,
        currency: &str,
    ) -> Result<PricePayload, MarketDataError>;
}
