use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use flowlens_normalizer::RawFlow;

struct CacheEntry {
    value: Arc<RawFlow>,
    stored_at: Instant,
}

/// In-memory TTL cache of raw flows keyed by flow id.
///
/// Entries are whole values: an insert either publishes the complete flow
/// or nothing. Reads share the lock; writes hold it only for the map update.
pub struct FlowCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl FlowCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `flow_id`, if any. Stale entries are left for the
    /// next insert to purge.
    pub async fn get(&self, flow_id: &str) -> Option<Arc<RawFlow>> {
        let entries = self.entries.read().await;
        entries
            .get(flow_id)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, flow_id: &str, value: Arc<RawFlow>) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            flow_id.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Returns true when an entry was removed
    pub async fn evict(&self, flow_id: &str) -> bool {
        self.entries.write().await.remove(flow_id).is_some()
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
