use dashmap::DashMap;
use flowlens_normalizer::RawFlow;
use flowlens_types::{FlowListEntry, FlowStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::FlowCache;
use crate::config::Config;
use crate::credential::SessionCredential;
use crate::error::Result;
use crate::http::HttpFlowSource;
use crate::retry::RetryPolicy;
use crate::source::FlowSource;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    /// Upper bound on listing pages fetched per `list_flows` call
    pub max_list_pages: u32,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            max_list_pages: 20,
        }
    }
}

/// Resolves flow ids to raw flows: cache first, then the remote source
/// under the retry policy.
///
/// Concurrent misses for one id share a single fetch; different ids never
/// wait on each other.
pub struct FlowStore {
    source: Arc<dyn FlowSource>,
    cache: FlowCache,
    retry: RetryPolicy,
    max_list_pages: u32,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl FlowStore {
    pub fn new(source: Arc<dyn FlowSource>, options: StoreOptions) -> Self {
        Self {
            source,
            cache: FlowCache::new(options.cache_ttl),
            retry: options.retry,
            max_list_pages: options.max_list_pages.max(1),
            inflight: DashMap::new(),
        }
    }

    /// Store talking to the platform over HTTP.
    pub fn from_config(config: &Config, credential: SessionCredential) -> Result<Self> {
        let source = HttpFlowSource::new(&config.remote, credential)?;
        info!(base_url = %source.base_url(), "using FlowLens platform");
        Ok(Self::new(Arc::new(source), config.store_options()))
    }

    pub fn cache(&self) -> &FlowCache {
        &self.cache
    }

    pub async fn resolve(&self, flow_id: &str) -> Result<Arc<RawFlow>> {
        if let Some(hit) = self.cache.get(flow_id).await {
            debug!(flow_id, "cache hit");
            return Ok(hit);
        }

        let lock = self
            .inflight
            .entry(flow_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = {
            let _guard = lock.lock().await;
            // Another caller may have populated the entry while we waited
            match self.cache.get(flow_id).await {
                Some(hit) => {
                    debug!(flow_id, "cache hit after waiting for in-flight fetch");
                    Ok(hit)
                }
                None => self.fetch_and_cache(flow_id).await,
            }
        };

        drop(lock);
        self.inflight
            .remove_if(flow_id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn fetch_and_cache(&self, flow_id: &str) -> Result<Arc<RawFlow>> {
        debug!(flow_id, "cache miss");
        let source = self.source.clone();
        let raw = self
            .retry
            .run("fetch flow", || {
                let source = source.clone();
                let flow_id = flow_id.to_string();
                async move { source.fetch_flow(&flow_id).await }
            })
            .await?;

        info!(flow_id, records = raw.timeline.len(), status = %raw.status, "fetched flow");
        let raw = Arc::new(raw);
        if raw.status == FlowStatus::Expired {
            if self.cache.evict(flow_id).await {
                debug!(flow_id, "evicted expired flow");
            }
        } else {
            self.cache.insert(flow_id, raw.clone()).await;
        }
        Ok(raw)
    }

    /// Walk the remote listing, following `next_page` until it ends or
    /// `max_list_pages` pages have been read.
    pub async fn list_flows(&self) -> Result<Vec<FlowListEntry>> {
        let mut entries = Vec::new();
        let mut page = 1u32;

        for fetched in 1..=self.max_list_pages {
            let source = self.source.clone();
            let batch = self
                .retry
                .run("list flows", || {
                    let source = source.clone();
                    async move { source.fetch_flow_page(page).await }
                })
                .await?;

            for summary in batch.flows {
                if summary.status == FlowStatus::Expired && self.cache.evict(&summary.id).await {
                    debug!(flow_id = %summary.id, "evicted expired flow");
                }
                entries.push(FlowListEntry {
                    id: summary.id,
                    title: summary.title,
                    created_at: summary.created_at,
                    status: summary.status,
                });
            }

            match batch.next_page {
                Some(next) if next > page => {
                    if fetched == self.max_list_pages {
                        warn!(
                            "flow listing truncated after {} pages",
                            self.max_list_pages
                        );
                    }
                    page = next;
                }
                Some(next) => {
                    warn!(page, next, "ignoring non-increasing next_page");
                    break;
                }
                None => break,
            }
        }

        info!(flows = entries.len(), "listed flows");
        Ok(entries)
    }

    pub async fn evict(&self, flow_id: &str) -> bool {
        self.cache.evict(flow_id).await
    }
}
