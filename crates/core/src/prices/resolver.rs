//! Price resolver.
//!
//! Every call moves through `CheckCache -> TryChain -> ConsultSnapshot`
//! and ends in either a payload or a [`ResolutionError`]:
//!
//! 1. Unless the cache is bypassed, a fresh cache entry is returned with
//!    `cached = true`.
//! 2. The provider chain is walked. On success the payload is written to
//!    the cache and to the snapshot store, then returned with
//!    `cached = false`.
//! 3. If the chain is exhausted the snapshot store is consulted.
//! 4. If that is empty too, the resolution fails.
//!
//! Diagnostics mode forces a cache bypass but still writes through.

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;

use nisab_market_data::{Instrument, PricePayload, ProviderChain};

use super::cache::RequestCache;
use super::errors::ResolutionError;
use super::nisab::NisabValue;
use super::snapshot_store::SnapshotStore;
use super::views::{FailureView, PriceView};
use crate::constants::MONTHLY_FALLBACK_TAG;

/// Per-call resolution switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub bypass_cache: bool,
    pub diagnostics: bool,
}

impl ResolveOptions {
    pub fn fresh() -> Self {
        Self {
            bypass_cache: true,
            diagnostics: false,
        }
    }

    pub fn with_diagnostics() -> Self {
        Self {
            bypass_cache: true,
            diagnostics: true,
        }
    }

    fn skips_cache(&self) -> bool {
        self.bypass_cache || self.diagnostics
    }
}

/// A resolved payload and whether it came from the request cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPrice {
    pub payload: PricePayload,
    pub cached: bool,
}

/// Result of refreshing one instrument's snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub instrument: Instrument,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    fn failed(instrument: Instrument, error: impl Into<String>) -> Self {
        Self {
            instrument,
            ok: false,
            provider: None,
            error: Some(error.into()),
        }
    }
}

pub struct PriceResolver {
    chain: Arc<ProviderChain>,
    cache: Arc<RequestCache>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl PriceResolver {
    pub fn new(
        chain: Arc<ProviderChain>,
        cache: Arc<RequestCache>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            chain,
            cache,
            snapshots,
        }
    }

    pub fn currency(&self) -> &str {
        self.chain.currency()
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    pub async fn resolve(
        &self,
        instrument: Instrument,
        options: ResolveOptions,
    ) -> Result<ResolvedPrice, ResolutionError> {
        if !options.skips_cache() {
            if let Some(payload) = self.cache.get(instrument) {
                debug!("Cache hit for {}", instrument);
                return Ok(ResolvedPrice {
                    payload,
                    cached: true,
                });
            }
        }

        let diagnostics = match self.chain.resolve(instrument, options.diagnostics).await {
            Ok(payload) => {
                self.cache.set(instrument, payload.clone());
                self.persist_snapshot(instrument, &payload).await;
                return Ok(ResolvedPrice {
                    payload,
                    cached: false,
                });
            }
            Err(e) => e.into_diagnostics(),
        };

        if let Some(payload) = self.snapshots.read(instrument).await {
            warn!(
                "All providers failed for {}, serving snapshot from {}",
                instrument, payload.fetched_at
            );
            return Ok(ResolvedPrice {
                payload,
                cached: false,
            });
        }

        error!("No price available for {}", instrument);
        Err(ResolutionError::Unavailable {
            instrument,
            diagnostics: diagnostics.map(|d| d.entries()),
        })
    }

    async fn persist_snapshot(&self, instrument: Instrument, payload: &PricePayload) {
        if let Err(e) = self.snapshots.write(instrument, payload).await {
            warn!("Failed to store {} snapshot: {}", instrument, e);
        }
    }

    /// Resolve gold and derive the Nisab threshold from it.
    pub async fn resolve_nisab(
        &self,
        options: ResolveOptions,
    ) -> Result<NisabValue, ResolutionError> {
        let resolved = self.resolve(Instrument::Gold, options).await?;
        Ok(NisabValue::from_gold(&resolved.payload, resolved.cached))
    }

    /// Resolve every instrument with the cache bypassed.
    ///
    /// Live successes land in the snapshot store through the normal
    /// write-through. A snapshot-served result is reported as a failure
    /// since nothing new was stored.
    pub async fn refresh_snapshots(&self) -> Vec<RefreshOutcome> {
        let mut outcomes = Vec::with_capacity(Instrument::ALL.len());

        for instrument in Instrument::ALL {
            let outcome = match self.resolve(instrument, ResolveOptions::fresh()).await {
                Ok(resolved) if resolved.payload.provider_tag == MONTHLY_FALLBACK_TAG => {
                    RefreshOutcome::failed(instrument, "all providers failed")
                }
                Ok(resolved) => RefreshOutcome {
                    instrument,
                    ok: true,
                    provider: Some(resolved.payload.provider_tag),
                    error: None,
                },
                Err(e) => RefreshOutcome::failed(instrument, e.to_string()),
            };
            outcomes.push(outcome);
        }

        info!(
            "Snapshot refresh finished: {}/{} instruments updated",
            outcomes.iter().filter(|o| o.ok).count(),
            outcomes.len()
        );
        outcomes
    }

    /// Resolve and shape the result for callers.
    pub async fn quote(
        &self,
        instrument: Instrument,
        want_grams: bool,
        bypass_cache: bool,
        diagnostics: bool,
    ) -> Result<PriceView, FailureView> {
        let options = ResolveOptions {
            bypass_cache,
            diagnostics,
        };
        self.resolve(instrument, options)
            .await
            .map(|resolved| PriceView::new(&resolved, want_grams))
            .map_err(FailureView::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{Error, Result};
    use crate::prices::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use nisab_market_data::{MarketDataError, MetalPriceProvider, ProviderCapabilities};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct MockProvider {
        id: &'static str,
        price: Option<f64>,
        down: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn up(id: &'static str, price: f64) -> Arc<Self> {
            Arc::new(Self {
                id,
                price: Some(price),
                down: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            })
        }

        fn down(id: &'static str) -> Arc<Self> {
            Arc::new(Self {
                id,
                price: None,
                down: AtomicBool::new(true),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MetalPriceProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                instruments: &[Instrument::Gold, Instrument::Silver],
                requires_credential: false,
            }
        }

        async fn fetch_price(
            &self,
            instrument: Instrument,
            currency: &str,
        ) -> std::result::Result<PricePayload, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match self.price {
                Some(price) if !self.down.load(Ordering::SeqCst) => {
                    PricePayload::from_unit_price(instrument, price, currency, self.id)
                }
                _ => Err(MarketDataError::Unavailable {
                    provider: self.id.to_string(),
                    message: "HTTP 503 Service Unavailable".to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct MemorySnapshots {
        stored: Mutex<Vec<(Instrument, PricePayload)>>,
        preset: Option<PricePayload>,
        fail_writes: bool,
    }

    #[async_trait]
    impl SnapshotStore for MemorySnapshots {
        async fn read(&self, instrument: Instrument) -> Option<PricePayload> {
            self.preset
                .clone()
                .filter(|p| p.instrument == instrument)
                .map(|p| p.retagged(MONTHLY_FALLBACK_TAG))
        }

        async fn write(&self, instrument: Instrument, payload: &PricePayload) -> Result<()> {
            if self.fail_writes {
                return Err(Error::from(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                )));
            }
            self.stored.lock().unwrap().push((instrument, payload.clone()));
            Ok(())
        }
    }

    fn resolver(
        providers: Vec<Arc<MockProvider>>,
        snapshots: Arc<MemorySnapshots>,
    ) -> (Arc<ManualClock>, PriceResolver) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap(),
        ));
        let providers: Vec<Arc<dyn MetalPriceProvider>> = providers
            .into_iter()
            .map(|p| p as Arc<dyn MetalPriceProvider>)
            .collect();
        let chain = Arc::new(ProviderChain::new(providers, "USD"));
        let cache = Arc::new(RequestCache::new(clock.clone()));
        (clock, PriceResolver::new(chain, cache, snapshots))
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_cached() {
        let a = MockProvider::up("a", 2000.0);
        let (clock, resolver) = resolver(vec![a.clone()], Arc::default());

        let first = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        assert!(!first.cached);
        assert!(first.payload.price_per_unit > 0.0);

        clock.advance(chrono::Duration::seconds(300));
        let second = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        assert!(second.cached);
        assert_eq!(second.payload, first.payload);
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_cache_walks_chain_again() {
        let a = MockProvider::up("a", 2000.0);
        let (clock, resolver) = resolver(vec![a.clone()], Arc::default());

        resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        clock.advance(chrono::Duration::seconds(601));
        let again = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();

        assert!(!again.cached);
        assert_eq!(a.calls(), 2);
    }

    #[tokio::test]
    async fn test_attributes_first_working_provider() {
        let a = MockProvider::down("a");
        let b = MockProvider::up("b", 2010.0);
        let c = MockProvider::up("c", 2020.0);
        let (_, resolver) = resolver(vec![a.clone(), b.clone(), c.clone()], Arc::default());

        let resolved = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        assert_eq!(resolved.payload.provider_tag, "b");
        assert_eq!((a.calls(), b.calls(), c.calls()), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_success_writes_snapshot() {
        let snapshots = Arc::new(MemorySnapshots::default());
        let (_, resolver) = resolver(vec![MockProvider::up("a", 2000.0)], snapshots.clone());

        resolver.resolve(Instrument::Silver, ResolveOptions::default()).await.unwrap();

        let stored = snapshots.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, Instrument::Silver);
        assert_eq!(stored[0].1.provider_tag, "a");
    }

    #[tokio::test]
    async fn test_snapshot_write_failure_is_not_surfaced() {
        let snapshots = Arc::new(MemorySnapshots {
            fail_writes: true,
            ..Default::default()
        });
        let (_, resolver) = resolver(vec![MockProvider::up("a", 2000.0)], snapshots);

        let resolved = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        assert_eq!(resolved.payload.provider_tag, "a");
    }

    #[tokio::test]
    async fn test_full_outage_serves_snapshot() {
        let snapshot = PricePayload::from_unit_price(Instrument::Gold, 1950.0, "USD", "old").unwrap();
        let snapshots = Arc::new(MemorySnapshots {
            preset: Some(snapshot),
            ..Default::default()
        });
        let (_, resolver) = resolver(
            vec![MockProvider::down("a"), MockProvider::down("b")],
            snapshots,
        );

        let resolved = resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        assert_eq!(resolved.payload.price_per_unit, 1950.0);
        assert_eq!(resolved.payload.provider_tag, MONTHLY_FALLBACK_TAG);
        assert!(!resolved.cached);
        assert!(resolver.cache().get(Instrument::Gold).is_none());
    }

    #[tokio::test]
    async fn test_total_failure() {
        let (_, resolver) = resolver(vec![MockProvider::down("a")], Arc::default());

        let err = resolver
            .resolve(Instrument::Gold, ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::Unavailable {
                instrument: Instrument::Gold,
                diagnostics: None,
            }
        );
    }

    #[tokio::test]
    async fn test_diagnostics_mode_bypasses_cache_and_reports() {
        let a = MockProvider::up("a", 2000.0);
        let (_, resolver) = resolver(vec![a.clone()], Arc::default());

        resolver.resolve(Instrument::Gold, ResolveOptions::default()).await.unwrap();
        let options = ResolveOptions {
            bypass_cache: false,
            diagnostics: true,
        };
        let resolved = resolver.resolve(Instrument::Gold, options).await.unwrap();
        assert!(!resolved.cached);
        assert_eq!(a.calls(), 2);

        a.down.store(true, Ordering::SeqCst);
        let view = resolver.quote(Instrument::Gold, false, false, true).await.unwrap_err();
        let diagnostics = view.diagnostics.unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].provider, "a");
        assert!(diagnostics[0].message.contains("503"));
    }

    #[tokio::test]
    async fn test_nisab_uses_gold() {
        let (_, resolver) = resolver(vec![MockProvider::up("a", 6274.64)], Arc::default());

        let value = resolver.resolve_nisab(ResolveOptions::default()).await.unwrap();
        assert!((value.nisab - 17147.42).abs() < 0.05);
        assert_eq!(value.provider, "a");
        assert!(!value.cached);
    }

    #[tokio::test]
    async fn test_refresh_reports_each_instrument() {
        let snapshots = Arc::new(MemorySnapshots::default());
        let (_, resolver) = resolver(vec![MockProvider::up("a", 30.0)], snapshots.clone());

        let outcomes = resolver.refresh_snapshots().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.ok));
        assert_eq!(snapshots.stored.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_quote_gram_view() {
        let (_, resolver) = resolver(vec![MockProvider::up("a", 6274.64)], Arc::default());

        let view = resolver.quote(Instrument::Gold, true, false, false).await.unwrap();
        assert!((view.price - 201.7344).abs() < 1e-3);
        assert_eq!(view.currency, "USD");
    }

    #[tokio::test]
    async fn test_concurrent_misses_each_walk_the_chain() {
        let a = MockProvider::up("a", 2000.0);
        let (_, resolver) = resolver(vec![a.clone()], Arc::default());

        let (first, second) = tokio::join!(
            resolver.resolve(Instrument::Gold, ResolveOptions::default()),
            resolver.resolve(Instrument::Gold, ResolveOptions::default()),
        );

        assert!(!first.unwrap().cached);
        assert!(!second.unwrap().cached);
        assert_eq!(a.calls(), 2);
    }
}
