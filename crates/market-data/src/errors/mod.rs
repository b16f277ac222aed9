//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The single fault type every provider adapter returns
//! - [`ChainError`]: Outcome of a provider chain where no adapter succeeded
//! - [`RetryClass`]: Classification for how the chain records a failure

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

use crate::registry::FetchDiagnostics;

/// Errors that can occur during a provider lookup.
///
/// Adapters never let any other fault escape: transport errors, bad statuses
/// and malformed bodies are all folded into one of these variants.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The adapter needs a credential that is not configured.
    /// No network call was made; the chain skips this provider.
    #[error("Credential missing: {provider}")]
    CredentialMissing {
        /// The provider lacking a credential
        provider: String,
    },

    /// The upstream could not be reached, timed out, or answered with a
    /// non-success status.
    #[error("Provider unavailable: {provider} - {message}")]
    Unavailable {
        /// The provider that failed
        provider: String,
        /// Transport or status detail
        message: String,
    },

    /// The upstream answered successfully but the body lacked the required
    /// numeric fields or carried non-finite / non-positive values.
    #[error("Parse error: {provider} - {message}")]
    ParseError {
        /// The provider whose response was rejected
        provider: String,
        /// What was wrong with the body
        message: String,
    },

    /// The instrument is not priced by this provider, or the name could not
    /// be parsed.
    #[error("Unsupported instrument: {0}")]
    UnsupportedInstrument(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use nisab_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::CredentialMissing { provider: "goldapi.io".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Skip);
    ///
    /// let error = MarketDataError::Unavailable {
    ///     provider: "metalpriceapi".to_string(),
    ///     message: "HTTP 503".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::NextProvider);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::CredentialMissing { .. } | Self::UnsupportedInstrument(_) => RetryClass::Skip,
            Self::Unavailable { .. } | Self::ParseError { .. } => RetryClass::NextProvider,
        }
    }

    /// Map a transport error into the adapter taxonomy.
    pub fn from_transport(provider: &str, error: reqwest::Error) -> Self {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if let Some(status) = error.status() {
            format!("HTTP {}", status)
        } else {
            error.to_string()
        };
        Self::Unavailable {
            provider: provider.to_string(),
            message,
        }
    }

    pub fn parse(provider: &str, message: impl Into<String>) -> Self {
        Self::ParseError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

/// Failure of a whole provider chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Every provider was skipped or failed.
    ///
    /// Diagnostics are only present when the caller asked for them.
    #[error("All providers failed")]
    Exhausted {
        diagnostics: Option<FetchDiagnostics>,
    },
}

impl ChainError {
    /// Consume the error, returning any collected diagnostics.
    pub fn into_diagnostics(self) -> Option<FetchDiagnostics> {
        match self {
            Self::Exhausted { diagnostics } => diagnostics,
        }
    }
}
