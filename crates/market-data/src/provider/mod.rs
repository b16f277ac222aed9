//! Price provider abstractions and implementations.
//!
//! This module contains:
//! - The `MetalPriceProvider` trait that all providers implement
//! - Provider capabilities
//! - Concrete provider implementations (GoldAPI.io, Metal Price API, gold-api.com)
//!
//! # Architecture
//!
//! The provider system is designed to be:
//! - **Provider-agnostic**: The chain only sees `MetalPriceProvider` and `MarketDataError`
//! - **Extensible**: New providers can be added by implementing `MetalPriceProvider`
//! - **Contained**: Providers never panic or leak transport errors; every fault
//!   is mapped onto the adapter error taxonomy

mod capabilities;
mod http;
mod traits;

pub mod gold_api_com;
pub mod gold_api_io;
pub mod metal_price_api;

// Re-exports
pub use capabilities::ProviderCapabilities;
pub use http::DEFAULT_REQUEST_TIMEOUT;
pub use traits::MetalPriceProvider;
