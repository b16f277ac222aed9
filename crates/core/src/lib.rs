//! Nisab Core - price resolution services.
//!
//! This crate wires the provider chain from `nisab-market-data` into a
//! resolver with a short-lived request cache and a durable monthly
//! snapshot store, and derives the Nisab threshold from the gold price.

pub mod constants;
pub mod errors;
pub mod prices;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
