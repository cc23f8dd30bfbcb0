//! In-memory flow source with call counting and scripted failures.

use async_trait::async_trait;
use flowlens_normalizer::{RawFlow, RawFlowPage};
use flowlens_store::{Error, FlowSource, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Outcome forced onto the next call, ahead of the stored data.
#[derive(Debug, Clone)]
pub enum Scripted {
    Fail(Error),
    /// Never completes; only a deadline gets the caller out
    Hang,
    /// Panics inside the call
    Panic,
}

/// [`FlowSource`] serving flows and listing pages from memory.
///
/// Scripted outcomes are consumed in order by `fetch_flow` and
/// `fetch_flow_page` alike. Once the script is empty, calls answer from the
/// stored data.
#[derive(Default)]
pub struct FakeFlowSource {
    flows: Mutex<HashMap<String, RawFlow>>,
    pages: Mutex<Vec<RawFlowPage>>,
    script: Mutex<VecDeque<Scripted>>,
    always_hang: AtomicBool,
    latency: Duration,
    fetch_count: AtomicUsize,
    list_count: AtomicUsize,
}

impl FakeFlowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(self, flow: RawFlow) -> Self {
        self.put_flow(flow);
        self
    }

    /// Listing pages, served for page numbers 1..=n in order
    pub fn with_pages(self, pages: Vec<RawFlowPage>) -> Self {
        *self.pages.lock().unwrap() = pages;
        self
    }

    /// Delay every call that reaches the stored data
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn put_flow(&self, flow: RawFlow) {
        self.flows.lock().unwrap().insert(flow.id.clone(), flow);
    }

    pub fn push(&self, outcome: Scripted) {
        self.script.lock().unwrap().push_back(outcome);
    }

    pub fn push_failure(&self, error: Error) {
        self.push(Scripted::Fail(error));
    }

    /// Make every call hang from now on
    pub fn hang_forever(&self) {
        self.always_hang.store(true, Ordering::SeqCst);
    }

    /// Number of `fetch_flow` calls made so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    /// Number of `fetch_flow_page` calls made so far
    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    async fn play_script(&self) -> Result<()> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Hang) => std::future::pending().await,
            Some(Scripted::Panic) => panic!("scripted flow source panic"),
            None if self.always_hang.load(Ordering::SeqCst) => std::future::pending().await,
            None => {
                if !self.latency.is_zero() {
                    tokio::time::sleep(self.latency).await;
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl FlowSource for FakeFlowSource {
    async fn fetch_flow(&self, flow_id: &str) -> Result<RawFlow> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.play_script().await?;

        self.flows
            .lock()
            .unwrap()
            .get(flow_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(flow_id.to_string()))
    }

    async fn fetch_flow_page(&self, page: u32) -> Result<RawFlowPage> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        self.play_script().await?;

        let pages = self.pages.lock().unwrap();
        Ok(pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or(RawFlowPage {
                flows: vec![],
                next_page: None,
            }))
    }
}
