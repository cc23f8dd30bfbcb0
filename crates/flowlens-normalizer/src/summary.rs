use flowlens_types::{Event, EventPayload, FlowSummary, RequestOutcome, VideoArtifact};
use url::Url;

/// Compute aggregate counters for an ordered timeline.
///
/// `duration_ms` prefers the video length; without a video it falls back to
/// the time of the last event.
pub fn summarize(events: &[Event], video: Option<&VideoArtifact>) -> FlowSummary {
    let mut summary = FlowSummary {
        events_count: events.len(),
        duration_ms: video
            .map(|v| v.duration_ms)
            .or_else(|| events.last().map(|e| e.relative_time_ms))
            .unwrap_or(0),
        ..Default::default()
    };

    for event in events {
        *summary
            .events_by_kind
            .entry(event.kind().as_str().to_string())
            .or_default() += 1;

        match &event.payload {
            EventPayload::Network(net) => {
                // failed requests never left the browser
                if net.outcome != RequestOutcome::Failed {
                    summary.network_requests_count += 1;
                }

                let status_key = match (net.outcome, net.status) {
                    (RequestOutcome::Completed, Some(status)) => status.to_string(),
                    (RequestOutcome::Failed, _) => "network_failed".to_string(),
                    _ => "no_response".to_string(),
                };
                *summary.requests_by_status.entry(status_key).or_default() += 1;

                if let Some(domain) = domain_of(&net.url) {
                    *summary.requests_by_domain.entry(domain).or_default() += 1;
                }
            }
            EventPayload::Console(console) if console.level == "error" => {
                summary.console_errors_count += 1;
            }
            _ => {}
        }
    }

    summary
}

fn domain_of(raw_url: &str) -> Option<String> {
    Url::parse(raw_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
