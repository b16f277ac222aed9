//! In-memory request cache.
//!
//! Holds the last successful resolution per instrument. Entries expire
//! lazily: a read past the TTL evicts the entry and misses. Nothing sweeps
//! the map in the background and nothing is persisted.
//!
//! The mutex only makes each map operation memory-safe. It does not
//! serialize resolutions, so concurrent misses may each walk the provider
//! chain.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use nisab_market_data::{Instrument, PricePayload};

use super::clock::Clock;
use crate::constants::DEFAULT_CACHE_TTL;

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: PricePayload,
    inserted_at: DateTime<Utc>,
}

/// Process-wide cache of resolved prices, keyed by instrument.
pub struct RequestCache {
    entries: Mutex<HashMap<Instrument, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RequestCache {
    /// Create a cache with the default 600 second TTL.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL, clock)
    }

    pub fn with_ttl(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<Instrument, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Request cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the cached payload if it is at most `ttl` old.
    ///
    /// An expired entry is removed before returning `None`.
    pub fn get(&self, instrument: Instrument) -> Option<PricePayload> {
        let now = self.clock.now();
        let mut entries = self.lock_entries();

        let entry = entries.get(&instrument)?;
        // A negative age (clock moved backwards) counts as fresh.
        let fresh = now
            .signed_duration_since(entry.inserted_at)
            .to_std()
            .map(|age| age <= self.ttl)
            .unwrap_or(true);

        if fresh {
            return Some(entry.payload.clone());
        }

        debug!("Cache entry for {} expired, evicting", instrument);
        entries.remove(&instrument);
        None
    }

    /// Store a payload, replacing any previous entry with a fresh timestamp.
    pub fn set(&self, instrument: Instrument, payload: PricePayload) {
        let entry = CacheEntry {
            payload,
            inserted_at: self.clock.now(),
        };
        self.lock_entries().insert(instrument, entry);
    }

    pub fn invalidate(&self, instrument: Instrument) {
        self.lock_entries().remove(&instrument);
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prices::clock::ManualClock;
    use chrono::TimeZone;

    fn setup() -> (Arc<ManualClock>, RequestCache) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap(),
        ));
        let cache = RequestCache::new(clock.clone());
        (clock, cache)
    }

    fn gold(price: f64) -> PricePayload {
        PricePayload::from_unit_price(Instrument::Gold, price, "USD", "TEST").unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let (_, cache) = setup();
        assert!(cache.is_empty());
        assert!(cache.get(Instrument::Gold).is_none());
    }

    #[test]
    fn test_hit_within_ttl() {
        let (clock, cache) = setup();
        cache.set(Instrument::Gold, gold(2000.0));

        clock.advance(chrono::Duration::seconds(599));
        assert_eq!(cache.get(Instrument::Gold).unwrap().price_per_unit, 2000.0);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let (clock, cache) = setup();
        cache.set(Instrument::Gold, gold(2000.0));

        clock.advance(chrono::Duration::seconds(600));
        assert!(cache.get(Instrument::Gold).is_some());
    }

    #[test]
    fn test_expired_entry_is_evicted() {
        let (clock, cache) = setup();
        cache.set(Instrument::Gold, gold(2000.0));

        clock.advance(chrono::Duration::seconds(600) + chrono::Duration::milliseconds(1));
        assert!(cache.get(Instrument::Gold).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_overwrites_and_refreshes_timestamp() {
        let (clock, cache) = setup();
        cache.set(Instrument::Gold, gold(2000.0));

        clock.advance(chrono::Duration::seconds(500));
        cache.set(Instrument::Gold, gold(2100.0));

        clock.advance(chrono::Duration::seconds(500));
        let hit = cache.get(Instrument::Gold).unwrap();
        assert_eq!(hit.price_per_unit, 2100.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_, cache) = setup();
        cache.set(Instrument::Gold, gold(2000.0));
        assert!(cache.get(Instrument::Silver).is_none());

        cache.invalidate(Instrument::Gold);
        assert!(cache.get(Instrument::Gold).is_none());
    }
}
