use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// NOTE: Event Model Design Goals
//
// 1. One timeline: network, console and DOM captures share a single ordered sequence
//    - Ordering key is relative_time_ms; capture order breaks ties
//    - index is assigned after sorting so agents can address events directly
//
// 2. Platform isolation: nothing here mirrors the recorder's raw field names
//    - The normalizer owns the mapping from the platform schema
//
// 3. Bounded payloads: text fields may carry a truncation marker
//    - Agents see "...[TRUNCATED]" instead of multi-megabyte bodies
//    - Headers and larger bodies are only produced on demand, one event at a time

/// A single timestamped occurrence within a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Event {
    /// Position in the normalized timeline (0-based)
    pub index: usize,

    /// Milliseconds since the flow started, never negative
    pub relative_time_ms: u64,

    /// Kind tag and kind-specific payload
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum EventPayload {
    Network(NetworkEvent),
    Console(ConsoleEvent),
    Dom(DomEvent),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Network(_) => EventKind::Network,
            EventPayload::Console(_) => EventKind::Console,
            EventPayload::Dom(_) => EventKind::Dom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkEvent {
    /// HTTP method (upper-case)
    pub method: String,

    pub url: String,

    /// Response status; absent while the request is pending or failed at network level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// Request payload, possibly truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<String>,

    /// Response payload, possibly truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,

    /// Only populated by detail normalization; empty in timeline views
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_headers: BTreeMap<String, String>,

    /// Recorder-assigned id pairing a request with its response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    pub outcome: RequestOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// A response was captured
    Completed,
    /// The request never received a response during the recording
    Pending,
    /// The request failed before reaching the server (DNS, CORS, offline)
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsoleEvent {
    /// Lower-cased console level (log, info, warn, error, debug)
    pub level: String,

    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceLocation {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DomEvent {
    /// Interaction type (click, input, scroll, navigation, ...)
    pub action: String,

    /// CSS selector of the target element
    pub selector: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Event kind tag, also used as the `kind` filter of `get_flow_events`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Network,
    Console,
    Dom,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Network, EventKind::Console, EventKind::Dom];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Network => "network",
            EventKind::Console => "console",
            EventKind::Dom => "dom",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "network" => Ok(EventKind::Network),
            "console" => Ok(EventKind::Console),
            "dom" => Ok(EventKind::Dom),
            other => Err(format!(
                "unknown event kind '{}' (expected one of: network, console, dom)",
                other
            )),
        }
    }
}
