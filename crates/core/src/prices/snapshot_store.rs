//! Monthly snapshot store.
//!
//! One JSON file per instrument maps `YYYY-MM` month keys to the last price
//! resolved during that month. The store is only read when every live
//! provider has failed.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use nisab_market_data::{Instrument, PricePayload};

use super::clock::Clock;
use crate::constants::MONTHLY_FALLBACK_TAG;
use crate::errors::Result;

/// Durable per-month price storage.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Best stored price for the instrument, tagged as a fallback.
    ///
    /// Never fails: unreadable storage reads as empty.
    async fn read(&self, instrument: Instrument) -> Option<PricePayload>;

    /// Upsert the current month's record for the instrument.
    async fn write(&self, instrument: Instrument, payload: &PricePayload) -> Result<()>;
}

/// On-disk shape of a single month's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub price: f64,
    pub price_per_unit: f64,
    pub price_per_gram: f64,
    pub currency: String,
    pub provider: String,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
}

impl SnapshotRecord {
    pub fn from_payload(payload: &PricePayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            price: payload.price_per_unit,
            price_per_unit: payload.price_per_unit,
            price_per_gram: payload.price_per_gram,
            currency: payload.currency.clone(),
            provider: payload.provider_tag.clone(),
            cached: true,
            timestamp,
        }
    }

    /// Rebuild a payload, attributed to the monthly fallback.
    ///
    /// Returns `None` when the stored prices no longer satisfy the payload
    /// invariants.
    pub fn to_payload(&self, instrument: Instrument) -> Option<PricePayload> {
        PricePayload::with_gram_price(
            instrument,
            self.price_per_unit,
            self.price_per_gram,
            self.currency.clone(),
            MONTHLY_FALLBACK_TAG,
        )
        .inspect_err(|e| warn!("Discarding stored {} snapshot: {}", instrument, e))
        .ok()
        .map(|p| p.observed_at(self.timestamp))
    }
}

/// Month key for a timestamp, e.g. `2024-03`.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

fn is_month_key(key: &str) -> bool {
    NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").is_ok() && key.len() == 7
}

/// Pick the entry for `current`, else the one with the greatest key.
fn select_record<'a, T>(records: &'a BTreeMap<String, T>, current: &str) -> Option<&'a T> {
    records.get(current).or_else(|| records.values().next_back())
}

/// [`SnapshotStore`] backed by `<dir>/<instrument>-monthly.json` files.
///
/// Writes within one store are serialized so that each load-modify-persist
/// cycle sees the previous one's result. Every persist goes through its own
/// temp file, so writers in other processes never share a partial file.
pub struct JsonFileSnapshotStore {
    dir: PathBuf,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
    tmp_seq: AtomicU64,
}

impl JsonFileSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            clock,
            write_lock: Mutex::new(()),
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn file_path(&self, instrument: Instrument) -> PathBuf {
        self.dir.join(format!("{}-monthly.json", instrument.as_str()))
    }

    /// Load the record map, treating a missing or corrupt file as empty.
    async fn load(&self, instrument: Instrument) -> BTreeMap<String, SnapshotRecord> {
        let path = self.file_path(instrument);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read snapshot file {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        let entries: BTreeMap<String, Value> = match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring corrupt snapshot file {}: {}", path.display(), e);
                return BTreeMap::new();
            }
        };

        entries
            .into_iter()
            .filter_map(|(key, value)| {
                if !is_month_key(&key) {
                    debug!("Skipping snapshot entry with invalid key '{}'", key);
                    return None;
                }
                match serde_json::from_value::<SnapshotRecord>(value) {
                    Ok(record) => Some((key, record)),
                    Err(e) => {
                        debug!("Skipping undecodable snapshot entry '{}': {}", key, e);
                        None
                    }
                }
            })
            .collect()
    }

    async fn persist(
        &self,
        instrument: Instrument,
        records: &BTreeMap<String, SnapshotRecord>,
    ) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.file_path(instrument);
        let tmp = self.dir.join(format!(
            ".{}-monthly.{}.{}.tmp",
            instrument.as_str(),
            std::process::id(),
            self.tmp_seq.fetch_add(1, Ordering::Relaxed)
        ));
        let body = serde_json::to_vec_pretty(records)?;

        if let Err(e) = tokio::fs::write(&tmp, body).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn read(&self, instrument: Instrument) -> Option<PricePayload> {
        let current = month_key(self.clock.now());
        let usable: BTreeMap<String, PricePayload> = self
            .load(instrument)
            .await
            .into_iter()
            .filter_map(|(key, record)| record.to_payload(instrument).map(|p| (key, p)))
            .collect();

        let payload = select_record(&usable, &current)?;

        debug!("Serving {} from snapshot taken at {}", instrument, payload.fetched_at);
        Some(payload.clone())
    }

    async fn write(&self, instrument: Instrument, payload: &PricePayload) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();
        let mut records = self.load(instrument).await;
        records.insert(month_key(now), SnapshotRecord::from_payload(payload, now));
        self.persist(instrument, &records).await?;
        debug!("Stored {} snapshot for {}", instrument, month_key(now));
        Ok(())
    }
}
