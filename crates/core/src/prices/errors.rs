use thiserror::Error;

use nisab_market_data::{Diagnostic, Instrument};

/// Terminal failure of a price resolution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// No live provider answered and no snapshot was stored.
    #[error("{instrument} price unavailable from all providers")]
    Unavailable {
        instrument: Instrument,
        /// Per-provider trace, present only in diagnostics mode.
        diagnostics: Option<Vec<Diagnostic>>,
    },
}

