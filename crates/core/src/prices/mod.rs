//! Price resolution.
//!
//! Wires the provider chain to a short-lived request cache and a durable
//! monthly snapshot store, and shapes results for callers.

mod cache;
mod client;
mod clock;
mod errors;
mod nisab;
mod resolver;
mod snapshot_store;
mod views;

pub use cache::RequestCache;
pub use client::{build_provider_chain, ProviderSettings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::ResolutionError;
pub use nisab::{nisab, per_gram, NisabValue};
pub use resolver::{PriceResolver, RefreshOutcome, ResolveOptions, ResolvedPrice};
pub use snapshot_store::{month_key, JsonFileSnapshotStore, SnapshotRecord, SnapshotStore};
pub use views::{FailureView, PriceView};
