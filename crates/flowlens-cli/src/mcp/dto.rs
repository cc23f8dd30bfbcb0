//! Tool argument and response types.

use flowlens_types::{Event, NetworkEvent};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct GetFlowArgs {
    pub flow_id: String,
    #[serde(default)]
    pub include_events: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetFlowEventsArgs {
    pub flow_id: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub start_ms: Option<u64>,
    #[serde(default)]
    pub end_ms: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetFlowEventArgs {
    pub flow_id: String,
    pub index: u64,
}

/// Filtered slice of a flow timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowEventsResponse {
    pub flow_id: String,
    /// Events matching the filter before `limit` was applied
    pub total_matching: usize,
    pub returned: usize,
    pub events: Vec<Event>,
}

/// One network event with headers and bodies bounded by the detail size limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkEventDetail {
    pub flow_id: String,
    pub index: usize,
    pub relative_time_ms: u64,
    pub network: NetworkEvent,
}
