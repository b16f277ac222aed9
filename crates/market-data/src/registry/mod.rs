//! Provider chain module.
//!
//! This module provides orchestration for price providers, including:
//! - Priority ordering and deduplication
//! - Sequential first-success-wins traversal
//! - Payload validation
//! - Opt-in diagnostics for failed steps

mod provider_chain;
mod skip_reason;
mod validator;

pub use provider_chain::ProviderChain;
pub use skip_reason::{Diagnostic, FetchDiagnostics, ProviderAttempt, SkipReason};
pub use validator::PriceValidator;
