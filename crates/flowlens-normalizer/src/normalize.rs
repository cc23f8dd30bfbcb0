use flowlens_types::*;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::schema::{NetworkResponseRecord, RawFlow, RawRecord};
use crate::summary::summarize;
use crate::truncate::{
    DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_DETAIL_BODY_BYTES, truncate_opt, truncate_text,
};

/// Default share of records that may be dropped before a flow counts as corrupt
pub const DEFAULT_MAX_DROP_RATIO: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizerConfig {
    /// Size bound for network bodies, console messages and DOM values
    pub max_body_bytes: usize,
    /// Size bound for bodies returned by [`Normalizer::normalize_detailed`]
    pub max_detail_body_bytes: usize,
    /// Fail with `CorruptFlow` when `dropped / total` exceeds this
    pub max_drop_ratio: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_detail_body_bytes: DEFAULT_MAX_DETAIL_BODY_BYTES,
            max_drop_ratio: DEFAULT_MAX_DROP_RATIO,
        }
    }
}

/// Converts platform-native flows into the canonical [`Flow`] model.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Detail {
    Timeline,
    Full,
}

/// Event before ordering; `staged` is kept in capture order.
struct Staged {
    raw_timestamp: i64,
    payload: EventPayload,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Timeline view: bodies bounded by `max_body_bytes`, no headers.
    pub fn normalize(&self, raw: &RawFlow) -> Result<Flow> {
        self.run(raw, Detail::Timeline)
    }

    /// Same events and indices as [`Normalizer::normalize`], but network
    /// events keep their headers and bodies are bounded by
    /// `max_detail_body_bytes`.
    pub fn normalize_detailed(&self, raw: &RawFlow) -> Result<Flow> {
        self.run(raw, Detail::Full)
    }

    fn run(&self, raw: &RawFlow, detail: Detail) -> Result<Flow> {
        let total = raw.timeline.len();
        let mut dropped = 0usize;
        let mut records: Vec<RawRecord> = Vec::with_capacity(total);
        // correlation_id -> first response captured for it, wherever it sits in the upload
        let mut responses: HashMap<String, NetworkResponseRecord> = HashMap::new();
        let mut unmatched = 0usize;

        for (position, value) in raw.timeline.iter().enumerate() {
            match serde_json::from_value::<RawRecord>(value.clone()) {
                Ok(RawRecord::Unknown) => {
                    warn!(
                        flow_id = %raw.id,
                        position,
                        kind = record_kind(value).unwrap_or("<none>"),
                        "dropping timeline record with unrecognized kind"
                    );
                    dropped += 1;
                }
                Ok(RawRecord::NetworkResponse(r)) => match responses.entry(r.correlation_id.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(r);
                    }
                    Entry::Occupied(_) => {
                        debug!(flow_id = %raw.id, position, correlation_id = %r.correlation_id, "duplicate response");
                        unmatched += 1;
                    }
                },
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(flow_id = %raw.id, position, error = %e, "dropping undecodable timeline record");
                    dropped += 1;
                }
            }
        }

        if total > 0 && dropped as f64 / total as f64 > self.config.max_drop_ratio {
            return Err(Error::CorruptFlow {
                flow_id: raw.id.clone(),
                dropped,
                total,
            });
        }

        let staged: Vec<Staged> = records
            .into_iter()
            .filter_map(|record| self.stage(record, &mut responses, detail))
            .collect();

        if !responses.is_empty() {
            debug!(
                flow_id = %raw.id,
                count = responses.len(),
                "responses without a captured request"
            );
            unmatched += responses.len();
        }

        let mut timed: Vec<(u64, EventPayload)> = staged
            .into_iter()
            .map(|s| (relative_time(s.raw_timestamp, raw.started_at), s.payload))
            .collect();
        // sort_by_key is stable: capture order survives for equal timestamps
        timed.sort_by_key(|(t, _)| *t);

        let events: Vec<Event> = timed
            .into_iter()
            .enumerate()
            .map(|(index, (relative_time_ms, payload))| Event {
                index,
                relative_time_ms,
                payload,
            })
            .collect();

        let video = raw.video.as_ref().map(|v| VideoArtifact {
            uri: v.url.clone(),
            duration_ms: v.duration_ms,
        });

        debug!(
            flow_id = %raw.id,
            events = events.len(),
            dropped,
            unmatched,
            "normalized flow"
        );

        Ok(Flow {
            id: raw.id.clone(),
            title: raw.title.clone(),
            description: raw.description.clone(),
            created_at: raw.created_at,
            status: raw.status,
            summary: summarize(&events, video.as_ref()),
            video,
            dropped_records: dropped,
            unmatched_responses: unmatched,
            events,
        })
    }

    fn stage(
        &self,
        record: RawRecord,
        responses: &mut HashMap<String, NetworkResponseRecord>,
        detail: Detail,
    ) -> Option<Staged> {
        let limit = match detail {
            Detail::Timeline => self.config.max_body_bytes,
            Detail::Full => self.config.max_detail_body_bytes,
        };
        let headers = |h: BTreeMap<String, String>| match detail {
            Detail::Timeline => BTreeMap::new(),
            Detail::Full => h,
        };

        let staged = match record {
            RawRecord::Network(r) => {
                let outcome = if r.status.is_some() {
                    RequestOutcome::Completed
                } else {
                    RequestOutcome::Pending
                };
                Staged {
                    raw_timestamp: r.timestamp,
                    payload: EventPayload::Network(NetworkEvent {
                        method: r.method.to_ascii_uppercase(),
                        url: r.url,
                        status: r.status,
                        duration_ms: r.duration_ms,
                        request_body: truncate_opt(r.request_body, limit),
                        response_body: truncate_opt(r.body, limit),
                        request_headers: headers(r.request_headers),
                        response_headers: headers(r.response_headers),
                        correlation_id: r.correlation_id,
                        outcome,
                    }),
                }
            }
            RawRecord::NetworkRequest(r) => {
                let mut net = NetworkEvent {
                    method: r.method.to_ascii_uppercase(),
                    url: r.url,
                    status: None,
                    duration_ms: None,
                    request_body: truncate_opt(r.body, limit),
                    response_body: None,
                    request_headers: headers(r.headers),
                    response_headers: BTreeMap::new(),
                    correlation_id: None,
                    outcome: if r.failed {
                        RequestOutcome::Failed
                    } else {
                        RequestOutcome::Pending
                    },
                };
                if let Some(response) = responses.remove(&r.correlation_id) {
                    net.status = Some(response.status);
                    net.duration_ms =
                        Some(response.timestamp.saturating_sub(r.timestamp).max(0) as u64);
                    net.response_body = truncate_opt(response.body, limit);
                    net.response_headers = headers(response.headers);
                    net.outcome = RequestOutcome::Completed;
                }
                net.correlation_id = Some(r.correlation_id);
                Staged {
                    raw_timestamp: r.timestamp,
                    payload: EventPayload::Network(net),
                }
            }
            RawRecord::Console(r) => Staged {
                raw_timestamp: r.timestamp,
                payload: EventPayload::Console(ConsoleEvent {
                    level: r.level.to_ascii_lowercase(),
                    message: truncate_text(r.message, limit),
                    source: r.source.map(|s| SourceLocation {
                        url: s.url,
                        line: s.line,
                        column: s.column,
                    }),
                }),
            },
            RawRecord::Dom(r) => Staged {
                raw_timestamp: r.timestamp,
                payload: EventPayload::Dom(DomEvent {
                    action: r.action,
                    selector: r.selector,
                    value: truncate_opt(r.value, limit),
                }),
            },
            // split off while decoding
            RawRecord::NetworkResponse(_) | RawRecord::Unknown => return None,
        };
        Some(staged)
    }
}

/// Offset from flow start, clamped at zero for records captured before the
/// recorder's reported start (clock skew between tabs and the extension).
pub fn relative_time(raw_timestamp: i64, started_at: i64) -> u64 {
    raw_timestamp.saturating_sub(started_at).max(0) as u64
}

fn record_kind(value: &Value) -> Option<&str> {
    value.get("kind").and_then(Value::as_str)
}
