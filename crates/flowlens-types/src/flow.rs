use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::event::Event;

/// Lifecycle state of a flow as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    /// Uploaded but not yet processed by the platform
    Pending,
    Ready,
    /// Retention window elapsed; captured data may be gone
    Expired,
    NotFound,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Pending => "pending",
            FlowStatus::Ready => "ready",
            FlowStatus::Expired => "expired",
            FlowStatus::NotFound => "not_found",
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoArtifact {
    pub uri: String,
    pub duration_ms: u64,
}

/// One recorded browsing session, normalized for agent consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Flow {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: FlowStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoArtifact>,
    pub summary: FlowSummary,
    /// Raw records excluded during normalization (unknown kind or undecodable payload)
    pub dropped_records: usize,
    /// Responses whose request was never captured, e.g. a recording started mid-request
    #[serde(default)]
    pub unmatched_responses: usize,
    pub events: Vec<Event>,
}

/// Aggregate counters over a flow's timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowSummary {
    pub duration_ms: u64,
    pub events_count: usize,
    /// Requests that reached the network (completed or still pending)
    pub network_requests_count: usize,
    pub console_errors_count: usize,
    /// Event count per kind tag
    pub events_by_kind: BTreeMap<String, usize>,
    /// Request count per HTTP status, plus "no_response" and "network_failed"
    pub requests_by_status: BTreeMap<String, usize>,
    /// Request count per host name
    pub requests_by_domain: BTreeMap<String, usize>,
}

/// Lightweight listing entry returned by `list_flows`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowListEntry {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub status: FlowStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlowList {
    pub flows: Vec<FlowListEntry>,
}
