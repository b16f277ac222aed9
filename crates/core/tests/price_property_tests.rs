//! Property-based integration tests for price resolution.
//!
//! These tests verify that the unit conversions, cache expiry and snapshot
//! selection hold across generated inputs, using the `proptest` crate.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use nisab_core::prices::{
    nisab, per_gram, JsonFileSnapshotStore, ManualClock, RequestCache, SnapshotStore,
};
use nisab_market_data::{Instrument, PricePayload, GRAMS_PER_TROY_OUNCE};
use proptest::prelude::*;

// =============================================================================
// Generators
// =============================================================================

fn arb_instrument() -> impl Strategy<Value = Instrument> {
    prop_oneof![Just(Instrument::Gold), Just(Instrument::Silver)]
}

/// Month keys between 2015-01 and 2034-12.
fn arb_month() -> impl Strategy<Value = (i32, u32)> {
    (2015i32..2035, 1u32..=12)
}

fn key((year, month): (i32, u32)) -> String {
    format!("{:04}-{:02}", year, month)
}

fn record_json(price: f64) -> serde_json::Value {
    serde_json::json!({
        "price": price,
        "price_per_unit": price,
        "price_per_gram": price / GRAMS_PER_TROY_OUNCE,
        "currency": "USD",
        "provider": "goldapi.io",
        "cached": true,
        "timestamp": "2020-01-01T00:00:00Z"
    })
}

// =============================================================================
// Conversions
// =============================================================================

proptest! {
    #[test]
    fn gram_price_round_trips_to_unit_price(
        instrument in arb_instrument(),
        price in 0.01f64..1_000_000.0,
    ) {
        let payload = PricePayload::from_unit_price(instrument, price, "USD", "p").unwrap();
        let gram = per_gram(&payload);

        prop_assert!(gram > 0.0);
        prop_assert!((gram * GRAMS_PER_TROY_OUNCE - price).abs() <= price * 1e-12);
        prop_assert!((nisab(gram) - gram * 85.0).abs() <= gram * 1e-12);
    }

    #[test]
    fn non_positive_prices_are_rejected(price in -1_000_000.0f64..=0.0) {
        prop_assert!(PricePayload::from_unit_price(Instrument::Gold, price, "USD", "p").is_err());
    }
}

// =============================================================================
// Cache expiry
// =============================================================================

proptest! {
    #[test]
    fn cache_serves_until_ttl_inclusive(age_ms in 0i64..1_200_000) {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let cache = RequestCache::new(clock.clone());
        let payload = PricePayload::from_unit_price(Instrument::Gold, 2000.0, "USD", "p").unwrap();

        cache.set(Instrument::Gold, payload);
        clock.advance(Duration::milliseconds(age_ms));

        prop_assert_eq!(cache.get(Instrument::Gold).is_some(), age_ms <= 600_000);
    }
}

// =============================================================================
// Snapshot selection
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn snapshot_read_prefers_current_month_else_latest(
        stored in prop::collection::btree_set(arb_month(), 1..8),
        current in arb_month(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let stored: Vec<(i32, u32)> = stored.into_iter().collect();
        let body: serde_json::Map<String, serde_json::Value> = stored
            .iter()
            .enumerate()
            .map(|(i, m)| (key(*m), record_json(1000.0 + i as f64)))
            .collect();
        std::fs::write(
            dir.path().join("gold-monthly.json"),
            serde_json::to_vec(&body).unwrap(),
        )
        .unwrap();

        let now = Utc.with_ymd_and_hms(current.0, current.1, 10, 0, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(now));
        let store = JsonFileSnapshotStore::new(dir.path(), clock);

        let payload = runtime.block_on(store.read(Instrument::Gold)).unwrap();

        let keys: BTreeSet<String> = stored.iter().map(|m| key(*m)).collect();
        let expected_key = if keys.contains(&key(current)) {
            key(current)
        } else {
            keys.iter().next_back().cloned().unwrap()
        };
        let expected_index = stored.iter().position(|m| key(*m) == expected_key).unwrap();

        prop_assert_eq!(payload.price_per_unit, 1000.0 + expected_index as f64);
        prop_assert_eq!(payload.provider_tag.as_str(), "monthly-fallback");
    }
}
