//! Raw flow builders and timeline record helpers.
//!
//! Records are produced as JSON values in the platform's wire shape so tests
//! exercise the same decoding path as production flows.

use chrono::{DateTime, TimeZone, Utc};
use flowlens_normalizer::{RawFlow, RawFlowPage, RawFlowSummary, RawVideo};
use flowlens_types::FlowStatus;
use serde_json::{Value, json};

/// Creation time shared by all fixtures
pub fn fixed_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

/// Fluent builder for [`RawFlow`].
pub struct FlowBuilder {
    flow: RawFlow,
}

impl FlowBuilder {
    /// Ready flow starting at epoch 0 with an empty timeline
    pub fn new(id: &str) -> Self {
        Self {
            flow: RawFlow {
                id: id.to_string(),
                title: format!("Flow {}", id),
                description: None,
                created_at: fixed_created_at(),
                status: FlowStatus::Ready,
                started_at: 0,
                video: None,
                timeline: vec![],
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.flow.title = title.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.flow.description = Some(description.to_string());
        self
    }

    pub fn status(mut self, status: FlowStatus) -> Self {
        self.flow.status = status;
        self
    }

    pub fn started_at(mut self, started_at: i64) -> Self {
        self.flow.started_at = started_at;
        self
    }

    pub fn video(mut self, url: &str, duration_ms: u64) -> Self {
        self.flow.video = Some(RawVideo {
            url: url.to_string(),
            duration_ms,
        });
        self
    }

    pub fn record(mut self, record: Value) -> Self {
        self.flow.timeline.push(record);
        self
    }

    pub fn records(mut self, records: impl IntoIterator<Item = Value>) -> Self {
        self.flow.timeline.extend(records);
        self
    }

    pub fn build(self) -> RawFlow {
        self.flow
    }
}

pub fn console(t: i64, level: &str, message: &str) -> Value {
    json!({"kind": "console", "timestamp": t, "level": level, "message": message})
}

/// Self-contained network capture; `status: None` leaves the request pending
pub fn network(t: i64, method: &str, url: &str, status: Option<u16>) -> Value {
    let mut record = json!({"kind": "network", "timestamp": t, "method": method, "url": url});
    if let Some(status) = status {
        record["status"] = json!(status);
    }
    record
}

pub fn network_request(t: i64, correlation_id: &str, method: &str, url: &str) -> Value {
    json!({
        "kind": "network_request",
        "timestamp": t,
        "correlation_id": correlation_id,
        "method": method,
        "url": url
    })
}

pub fn network_response(t: i64, correlation_id: &str, status: u16, body: Option<&str>) -> Value {
    let mut record = json!({
        "kind": "network_response",
        "timestamp": t,
        "correlation_id": correlation_id,
        "status": status
    });
    if let Some(body) = body {
        record["body"] = json!(body);
    }
    record
}

pub fn dom(t: i64, action: &str, selector: &str) -> Value {
    json!({"kind": "dom", "timestamp": t, "action": action, "selector": selector})
}

/// Record with a discriminator the normalizer does not know
pub fn unknown(t: i64, kind: &str) -> Value {
    json!({"kind": kind, "timestamp": t})
}

/// Flow `f1` starting at 50 with a console record at 100 captured before a
/// network record at 50.
pub fn checkout_flow() -> RawFlow {
    FlowBuilder::new("f1")
        .title("Checkout fails on submit")
        .started_at(50)
        .record(console(100, "error", "Uncaught TypeError: cart is undefined"))
        .record(network(50, "GET", "https://shop.example.com/api/cart", Some(200)))
        .build()
}

pub fn summary(id: &str, status: FlowStatus) -> RawFlowSummary {
    RawFlowSummary {
        id: id.to_string(),
        title: format!("Flow {}", id),
        created_at: fixed_created_at(),
        status,
    }
}

pub fn page(flows: Vec<RawFlowSummary>, next_page: Option<u32>) -> RawFlowPage {
    RawFlowPage { flows, next_page }
}
