//! Per-correlation-id event log for proxy operations
//!
//! Bounded by id count and idle time. Evicted or unknown ids read back as an
//! empty log.

use chrono::{DateTime, Utc};
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::config::LogStoreConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

type Entries = Arc<Mutex<Vec<LogEntry>>>;

/// Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct LogStore {
    entries: Cache<String, Entries>,
}

#[bon::bon]
impl LogStore {
    #[builder]
    pub fn new(
        #[builder(default = 10_000)] capacity: u64,
        #[builder(default = Duration::from_secs(3600))] idle_ttl: Duration,
    ) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle_ttl)
                .build(),
        }
    }
}

impl LogStore {
    pub fn from_config(config: &LogStoreConfig) -> Self {
        Self::builder()
            .capacity(config.capacity)
            .idle_ttl(config.idle_ttl())
            .build()
    }

    pub fn append(&self, id: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(id, %message, "Proxy log");

        let entries = self.entries.get_with(id.to_string(), Entries::default);
        entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(LogEntry {
                timestamp: Utc::now(),
                message,
            });
    }

    /// Entries in insertion order; empty for unknown ids.
    pub fn get(&self, id: &str) -> Vec<LogEntry> {
        self.entries
            .get(id)
            .map(|entries| entries.lock().unwrap_or_else(PoisonError::into_inner).clone())
            .unwrap_or_default()
    }

    /// Drops every id, not just one.
    pub fn clear_all(&self) {
        self.entries.invalidate_all();
        tracing::info!("Proxy logs cleared");
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(store: &LogStore, id: &str) -> Vec<String> {
        store.get(id).into_iter().map(|e| e.message).collect()
    }

    #[test]
    fn test_append_keeps_order_per_id() {
        let store = LogStore::default();
        store.append("a", "first");
        store.append("b", "other");
        store.append("a", "second");

        assert_eq!(messages(&store, "a"), vec!["first", "second"]);
        assert_eq!(messages(&store, "b"), vec!["other"]);

        let entries = store.get("a");
        assert!(entries[0].timestamp <= entries[1].timestamp);
    }

    #[test]
    fn test_unknown_id_is_empty() {
        assert!(LogStore::default().get("missing").is_empty());
    }

    #[test]
    fn test_clear_all_wipes_every_id() {
        let store = LogStore::default();
        store.append("a", "x");
        store.append("b", "y");

        store.clear_all();

        assert!(store.get("a").is_empty());
        assert!(store.get("b").is_empty());

        store.append("a", "after");
        assert_eq!(messages(&store, "a"), vec!["after"]);
    }

    #[test]
    fn test_clones_share_state() {
        let store = LogStore::from_config(&LogStoreConfig::default());
        let clone = store.clone();
        clone.append("id", "from clone");
        assert_eq!(messages(&store, "id"), vec!["from clone"]);
    }

    #[test]
    fn test_capacity_bounds_ids() {
        let store = LogStore::builder().capacity(2).build();
        for id in ["a", "b", "c", "d", "e"] {
            store.append(id, "x");
        }

        store.entries.run_pending_tasks();
        assert!(store.entries.entry_count() <= 2);
    }

    #[test]
    fn test_entry_wire_shape() {
        let store = LogStore::default();
        store.append("id", "hello");

        let value = serde_json::to_value(&store.get("id")[0]).unwrap();
        assert_eq!(value["message"], "hello");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
