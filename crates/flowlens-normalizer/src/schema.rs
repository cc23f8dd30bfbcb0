//! Raw flow shape served by the FlowLens platform.
//!
//! This is a versioned external contract: field names follow the platform,
//! not the canonical model in `flowlens-types`. Nothing outside this crate
//! should depend on the record layouts below.

use chrono::{DateTime, Utc};
use flowlens_types::FlowStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawFlow {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub status: FlowStatus,
    /// Recording start, epoch milliseconds
    pub started_at: i64,
    #[serde(default)]
    pub video: Option<RawVideo>,
    /// Capture records in upload order. Kept untyped so a single bad record
    /// is dropped instead of failing the whole flow.
    #[serde(default)]
    pub timeline: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawVideo {
    pub url: String,
    #[serde(default)]
    pub duration_ms: u64,
}

/// One page of `GET /flows`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawFlowPage {
    #[serde(default)]
    pub flows: Vec<RawFlowSummary>,
    #[serde(default)]
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawFlowSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub status: FlowStatus,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind")]
#[serde(rename_all = "snake_case")]
pub(crate) enum RawRecord {
    Network(NetworkRecord),
    NetworkRequest(NetworkRequestRecord),
    NetworkResponse(NetworkResponseRecord),
    Console(ConsoleRecord),
    Dom(DomRecord),
    #[serde(other)]
    Unknown,
}

/// Self-contained request/response capture
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct NetworkRecord {
    #[serde(alias = "t")]
    pub timestamp: i64,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub request_body: Option<String>,
    /// Response payload
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub request_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub response_headers: BTreeMap<String, String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct NetworkRequestRecord {
    #[serde(alias = "t")]
    pub timestamp: i64,
    pub correlation_id: String,
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Set by the recorder when the browser reported a network-level failure
    #[serde(default)]
    pub failed: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct NetworkResponseRecord {
    #[serde(alias = "t")]
    pub timestamp: i64,
    pub correlation_id: String,
    pub status: u16,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct ConsoleRecord {
    #[serde(alias = "t")]
    pub timestamp: i64,
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub source: Option<SourceRecord>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct SourceRecord {
    pub url: String,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct DomRecord {
    #[serde(alias = "t")]
    pub timestamp: i64,
    pub action: String,
    pub selector: String,
    #[serde(default)]
    pub value: Option<String>,
}
