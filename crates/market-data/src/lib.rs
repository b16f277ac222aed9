//! Nisab Market Data Crate
//!
//! This crate provides provider-agnostic precious metal spot price fetching
//! for the Nisab price service.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Gold and silver, quoted per troy ounce and per gram
//! - Multiple providers: GoldAPI.io, Metal Price API, gold-api.com
//! - A single adapter contract with a unified error taxonomy
//! - An ordered provider chain with opt-in diagnostics
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Instrument     |  (gold | silver)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  ProviderChain   |  (waterfall, first success wins)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (GoldAPI.io, Metal Price API, ...)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  PricePayload    |  (per-ounce + per-gram price)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Instrument`] - The priced metal
//! - [`PricePayload`] - Normalized, validated provider output
//! - [`MetalPriceProvider`] - Adapter contract for upstream sources
//! - [`ProviderChain`] - Ordered fallback across providers
//! - [`FetchDiagnostics`] - Per-provider failure reasons, collected on request

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

// Re-export all public types from models
pub use models::{
    unit_to_gram, Currency, Instrument, PricePayload, ProviderId, GRAMS_PER_TROY_OUNCE,
    GRAM_PRICE_TOLERANCE,
};

// Re-export error types
pub use errors::{ChainError, MarketDataError, RetryClass};

// Re-export provider types
pub use provider::gold_api_com::GoldApiComProvider;
pub use provider::gold_api_io::GoldApiIoProvider;
pub use provider::metal_price_api::MetalPriceApiProvider;
pub use provider::{MetalPriceProvider, ProviderCapabilities, DEFAULT_REQUEST_TIMEOUT};

// Re-export registry types
pub use registry::{
    Diagnostic, FetchDiagnostics, PriceValidator, ProviderAttempt, ProviderChain, SkipReason,
};
