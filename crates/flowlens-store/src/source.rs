use async_trait::async_trait;
use flowlens_normalizer::{RawFlow, RawFlowPage};

use crate::error::Result;

/// Remote origin of flow recordings.
///
/// One call is one attempt: implementations do not retry, cache or apply
/// deadlines. [`crate::FlowStore`] layers those on top.
#[async_trait]
pub trait FlowSource: Send + Sync {
    async fn fetch_flow(&self, flow_id: &str) -> Result<RawFlow>;

    /// Page numbers start at 1
    async fn fetch_flow_page(&self, page: u32) -> Result<RawFlowPage>;
}
