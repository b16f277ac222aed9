//! Skip reason tracking for provider chain diagnostics.

use serde::Serialize;

use crate::models::ProviderId;

/// Why a provider was skipped without being asked for a price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Provider needs a credential that is not configured.
    CredentialMissing,

    /// Provider does not price this instrument.
    InstrumentNotSupported,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CredentialMissing => write!(f, "credential missing"),
            Self::InstrumentNotSupported => write!(f, "instrument not supported"),
        }
    }
}

/// Record of a single non-successful provider step.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: ProviderId,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
}

impl ProviderAttempt {
    /// Human-readable reason for this step.
    pub fn message(&self) -> String {
        match (&self.skipped, &self.error) {
            (Some(skip), _) => format!("skipped: {}", skip),
            (None, Some(err)) => err.clone(),
            (None, None) => "unknown".to_string(),
        }
    }
}

/// Wire form of a diagnostic entry: `{provider, message}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub provider: String,
    pub message: String,
}

/// Per-provider failure reasons collected during one chain traversal.
///
/// Only allocated when the caller asks for diagnostics.
#[derive(Clone, Debug, Default)]
pub struct FetchDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, provider_id: ProviderId, reason: SkipReason) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: Some(reason),
            error: None,
        });
    }

    pub fn record_error(&mut self, provider_id: ProviderId, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            skipped: None,
            error: Some(error),
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({})", a.provider_id, skip)
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.provider_id, err)
                } else {
                    format!("{}: UNKNOWN", a.provider_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Entries in traversal order, in wire form.
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.attempts
            .iter()
            .map(|a| Diagnostic {
                provider: a.provider_id.to_string(),
                message: a.message(),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
