use anyhow::Result;
use chrono::{TimeZone, Utc};
use flowlens_normalizer::{
    Error, Normalizer, NormalizerConfig, RawFlow, RawVideo, TRUNCATION_MARKER,
};
use flowlens_types::{EventKind, EventPayload, FlowStatus};
use serde_json::{Value, json};

fn flow_with(started_at: i64, timeline: Vec<Value>) -> RawFlow {
    RawFlow {
        id: "f1".to_string(),
        title: "Login fails on Safari".to_string(),
        description: Some("Captured by the extension".to_string()),
        created_at: Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap(),
        status: FlowStatus::Ready,
        started_at,
        video: Some(RawVideo {
            url: "https://media.example.com/f1.webm".to_string(),
            duration_ms: 12_000,
        }),
        timeline,
    }
}

#[test]
fn test_console_and_network_are_ordered_by_relative_time() -> Result<()> {
    let raw = flow_with(
        50,
        vec![
            json!({"t": 100, "kind": "console", "level": "log", "message": "clicked"}),
            json!({"t": 50, "kind": "network", "method": "GET", "url": "https://api.example.com/me", "status": 200}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;

    let kinds: Vec<(EventKind, u64)> = flow
        .events
        .iter()
        .map(|e| (e.kind(), e.relative_time_ms))
        .collect();
    assert_eq!(kinds, vec![(EventKind::Network, 0), (EventKind::Console, 50)]);
    assert_eq!(flow.events[0].index, 0);
    assert_eq!(flow.events[1].index, 1);
    assert_eq!(flow.video.as_ref().map(|v| v.duration_ms), Some(12_000));
    Ok(())
}

#[test]
fn test_equal_timestamps_keep_capture_order() -> Result<()> {
    let timeline: Vec<Value> = (0..6)
        .map(|i| {
            json!({
                "kind": "dom",
                "timestamp": if i % 2 == 0 { 500 } else { 300 },
                "action": "input",
                "selector": format!("#field-{}", i),
            })
        })
        .collect();

    let flow = Normalizer::default().normalize(&flow_with(0, timeline))?;

    let selectors: Vec<String> = flow
        .events
        .iter()
        .map(|e| match &e.payload {
            EventPayload::Dom(d) => d.selector.clone(),
            other => panic!("unexpected payload {:?}", other),
        })
        .collect();
    assert_eq!(
        selectors,
        vec!["#field-1", "#field-3", "#field-5", "#field-0", "#field-2", "#field-4"]
    );

    let times: Vec<u64> = flow.events.iter().map(|e| e.relative_time_ms).collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn test_records_before_flow_start_clamp_to_zero() -> Result<()> {
    let raw = flow_with(
        10_000,
        vec![
            json!({"timestamp": 9_000, "kind": "console", "level": "warn", "message": "early"}),
            json!({"timestamp": 10_250, "kind": "dom", "action": "click", "selector": "button"}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;
    assert_eq!(flow.events[0].relative_time_ms, 0);
    assert_eq!(flow.events[1].relative_time_ms, 250);
    Ok(())
}

#[test]
fn test_unknown_kinds_dropped_below_threshold() -> Result<()> {
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 1, "kind": "rrweb_snapshot", "data": {}}),
            json!({"timestamp": 2, "kind": "dom", "action": "click", "selector": "a"}),
            json!({"timestamp": 3, "kind": "dom", "action": "click", "selector": "b"}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;
    assert_eq!(flow.events.len(), 2);
    assert_eq!(flow.dropped_records, 1);
    Ok(())
}

#[test]
fn test_too_many_drops_is_corrupt() {
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 1, "kind": "rrweb_snapshot"}),
            json!({"timestamp": 2, "kind": "websocket"}),
            json!({"timestamp": 3}),
            json!({"timestamp": 4, "kind": "dom", "action": "click", "selector": "b"}),
        ],
    );

    let err = Normalizer::default().normalize(&raw).unwrap_err();
    assert_eq!(
        err,
        Error::CorruptFlow {
            flow_id: "f1".to_string(),
            dropped: 3,
            total: 4,
        }
    );
    assert!(err.to_string().contains("3 of 4"));
}

#[test]
fn test_threshold_is_configurable() -> Result<()> {
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 1, "kind": "rrweb_snapshot"}),
            json!({"timestamp": 2, "kind": "dom", "action": "click", "selector": "b"}),
            json!({"timestamp": 3, "kind": "dom", "action": "click", "selector": "c"}),
            json!({"timestamp": 4, "kind": "dom", "action": "click", "selector": "d"}),
        ],
    );

    let strict = Normalizer::new(NormalizerConfig {
        max_drop_ratio: 0.1,
        ..Default::default()
    });
    assert!(matches!(strict.normalize(&raw), Err(Error::CorruptFlow { .. })));

    let lenient = Normalizer::default();
    assert_eq!(lenient.normalize(&raw)?.events.len(), 3);
    Ok(())
}

#[test]
fn test_large_bodies_are_truncated_with_marker() -> Result<()> {
    let body = "x".repeat(20_000);
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 1, "kind": "network", "method": "GET", "url": "https://api.example.com/dump", "status": 200, "body": body}),
            json!({"timestamp": 2, "kind": "console", "level": "error", "message": "y".repeat(9_000)}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;

    let EventPayload::Network(net) = &flow.events[0].payload else {
        panic!("expected network event");
    };
    let body = net.response_body.as_deref().unwrap_or_default();
    assert!(body.ends_with(TRUNCATION_MARKER));
    assert_eq!(body.len(), 8 * 1024 + TRUNCATION_MARKER.len());

    let EventPayload::Console(console) = &flow.events[1].payload else {
        panic!("expected console event");
    };
    assert!(console.message.ends_with(TRUNCATION_MARKER));
    assert_eq!(flow.summary.console_errors_count, 1);
    Ok(())
}

#[test]
fn test_recording_started_mid_request_is_not_corrupt() -> Result<()> {
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 1, "kind": "network_response", "correlation_id": "before-1", "status": 200}),
            json!({"timestamp": 2, "kind": "network_response", "correlation_id": "before-2", "status": 200}),
            json!({"timestamp": 3, "kind": "console", "level": "warn", "message": "slow"}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;
    assert_eq!(flow.events.len(), 1);
    assert_eq!(flow.dropped_records, 0);
    assert_eq!(flow.unmatched_responses, 2);
    assert_eq!(flow.summary.network_requests_count, 0);
    Ok(())
}

#[test]
fn test_pairing_ignores_upload_order() -> Result<()> {
    let raw = flow_with(
        0,
        vec![
            json!({"timestamp": 200, "kind": "network_response", "correlation_id": "r1", "status": 502}),
            json!({"timestamp": 100, "kind": "network_request", "correlation_id": "r1", "method": "put", "url": "https://api.example.com/cart"}),
            json!({"timestamp": 120, "kind": "dom", "action": "click", "selector": "#buy"}),
        ],
    );

    let flow = Normalizer::default().normalize(&raw)?;
    assert_eq!(flow.events.len(), 2);
    let EventPayload::Network(net) = &flow.events[0].payload else {
        panic!("expected network event");
    };
    assert_eq!(net.method, "PUT");
    assert_eq!(net.status, Some(502));
    assert_eq!(net.duration_ms, Some(100));
    assert_eq!(flow.summary.requests_by_status["502"], 1);
    Ok(())
}
