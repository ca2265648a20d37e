use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::settings::Settings;
use crate::stats::StatsRecord;
use crate::store::{KeyValueStore, MemoryStore};

pub const SETTINGS_KEY: &str = "wpmSettings";
pub const STATS_KEY: &str = "wpmStats";

/// Reads and writes the two persisted records.
///
/// Reads never fail: a missing, unreadable or malformed record yields the
/// default value. The first failed write swaps the backend for a
/// [`MemoryStore`] so the rest of the run keeps working; the caller picks
/// the one-time warning up through [`Persistence::take_degradation_warning`].
pub struct Persistence {
    store: Box<dyn KeyValueStore>,
    degraded: bool,
    warning_pending: bool,
}

impl Persistence {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            degraded: false,
            warning_pending: false,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    pub fn load_settings(&self) -> Settings {
        let settings: Settings = self.read(SETTINGS_KEY);
        match settings.validate() {
            Ok(()) => settings,
            Err(e) => {
                tracing::warn!("ignoring stored settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&mut self, settings: &Settings) {
        self.write(SETTINGS_KEY, settings);
    }

    pub fn load_stats(&self) -> StatsRecord {
        self.read(STATS_KEY)
    }

    /// Overwrites the whole stats record, stamping `last_updated`
    pub fn save_stats(&mut self, stats: &mut StatsRecord) {
        stats.last_updated = Some(Utc::now());
        self.write(STATS_KEY, &*stats);
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// True exactly once after the store fell back to memory
    pub fn take_degradation_warning(&mut self) -> bool {
        std::mem::take(&mut self.warning_pending)
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!(key, "failed to read record, using defaults: {}", e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key, "malformed record, using defaults: {}", e);
            T::default()
        })
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(key, "failed to encode record: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(key, &json) {
            tracing::warn!(key, "storage unavailable, keeping records in memory: {}", e);
            let mut fallback = MemoryStore::new();
            // MemoryStore writes cannot fail
            for other in [SETTINGS_KEY, STATS_KEY].into_iter().filter(|k| *k != key) {
                if let Ok(Some(raw)) = self.store.get(other) {
                    let _ = fallback.set(other, &raw);
                }
            }
            let _ = fallback.set(key, &json);
            self.store = Box::new(fallback);
            if !self.degraded {
                self.degraded = true;
                self.warning_pending = true;
            }
        } else {
            tracing::debug!(key, bytes = json.len(), "record saved");
        }
    }
}
