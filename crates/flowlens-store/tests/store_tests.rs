//! FlowStore behavior against an in-memory source, with a paused clock.

use flowlens_store::{Error, FlowStore, StoreOptions};
use flowlens_testing::fixtures::{self, FlowBuilder};
use flowlens_testing::{FakeFlowSource, Scripted};
use flowlens_types::FlowStatus;
use std::sync::Arc;
use std::time::Duration;

fn store_with(source: Arc<FakeFlowSource>) -> FlowStore {
    FlowStore::new(source, StoreOptions::default())
}

#[tokio::test(start_paused = true)]
async fn test_resolve_twice_within_ttl_fetches_once() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    let store = store_with(source.clone());

    let first = store.resolve("f1").await.unwrap();
    tokio::time::advance(Duration::from_secs(60)).await;
    let second = store.resolve("f1").await.unwrap();

    assert_eq!(source.fetch_count(), 1);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn test_resolve_after_ttl_refetches() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    let store = store_with(source.clone());

    store.resolve("f1").await.unwrap();
    tokio::time::advance(Duration::from_secs(301)).await;
    store.resolve("f1").await.unwrap();

    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_every_attempt_timing_out_is_unavailable_after_three_calls() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    source.hang_forever();
    let store = store_with(source.clone());

    let err = store.resolve("f1").await.unwrap_err();

    assert!(matches!(err, Error::Unavailable { attempts: 3, .. }), "{:?}", err);
    assert_eq!(source.fetch_count(), 3);
    assert!(store.cache().is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_single_hang_then_success() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    source.push(Scripted::Hang);
    let store = store_with(source.clone());

    let flow = store.resolve("f1").await.unwrap();

    assert_eq!(flow.id, "f1");
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_is_retried() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    source.push_failure(Error::Transient("503 Service Unavailable".to_string()));
    source.push_failure(Error::Transient("connection reset".to_string()));
    let store = store_with(source.clone());

    assert!(store.resolve("f1").await.is_ok());
    assert_eq!(source.fetch_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_unauthorized_and_not_found_are_not_retried() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    source.push_failure(Error::Unauthorized);
    let store = store_with(source.clone());

    assert_eq!(store.resolve("f1").await.unwrap_err(), Error::Unauthorized);
    assert_eq!(source.fetch_count(), 1);

    let err = store.resolve("missing").await.unwrap_err();
    assert_eq!(err, Error::NotFound("missing".to_string()));
    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_flow_is_returned_but_not_cached() {
    let source = Arc::new(
        FakeFlowSource::new().with_flow(FlowBuilder::new("old").status(FlowStatus::Expired).build()),
    );
    let store = store_with(source.clone());

    let flow = store.resolve("old").await.unwrap();
    assert_eq!(flow.status, FlowStatus::Expired);
    store.resolve("old").await.unwrap();

    assert_eq!(source.fetch_count(), 2);
    assert!(store.cache().is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_refetch_reporting_expired_evicts_cached_copy() {
    let source = Arc::new(FakeFlowSource::new().with_flow(FlowBuilder::new("f2").build()));
    let store = store_with(source.clone());
    store.resolve("f2").await.unwrap();

    source.put_flow(FlowBuilder::new("f2").status(FlowStatus::Expired).build());
    tokio::time::advance(Duration::from_secs(301)).await;
    store.resolve("f2").await.unwrap();

    assert!(store.cache().get("f2").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_explicit_evict_forces_refetch() {
    let source = Arc::new(FakeFlowSource::new().with_flow(fixtures::checkout_flow()));
    let store = store_with(source.clone());

    store.resolve("f1").await.unwrap();
    assert!(store.evict("f1").await);
    store.resolve("f1").await.unwrap();

    assert_eq!(source.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_share_one_fetch() {
    let source = Arc::new(
        FakeFlowSource::new()
            .with_flow(fixtures::checkout_flow())
            .with_flow(FlowBuilder::new("f2").build())
            .with_latency(Duration::from_millis(500)),
    );
    let store = Arc::new(store_with(source.clone()));

    let mut handles = Vec::new();
    for id in ["f1", "f1", "f1", "f2"] {
        let store = store.clone();
        handles.push(tokio::spawn(async move { store.resolve(id).await }));
    }
    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(source.fetch_count(), 2);
    assert!(Arc::ptr_eq(&results[0], &results[1]));
    assert!(Arc::ptr_eq(&results[0], &results[2]));
    assert_eq!(results[3].id, "f2");
}

#[tokio::test(start_paused = true)]
async fn test_list_flows_follows_pagination() {
    let source = Arc::new(FakeFlowSource::new().with_pages(vec![
        fixtures::page(
            vec![
                fixtures::summary("a", FlowStatus::Ready),
                fixtures::summary("b", FlowStatus::Pending),
            ],
            Some(2),
        ),
        fixtures::page(vec![fixtures::summary("c", FlowStatus::Ready)], None),
    ]));
    let store = store_with(source.clone());

    let flows = store.list_flows().await.unwrap();

    let ids: Vec<&str> = flows.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert_eq!(flows[1].status, FlowStatus::Pending);
    assert_eq!(source.list_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_list_flows_stops_at_page_limit_and_on_cycles() {
    let looping = vec![
        fixtures::page(vec![fixtures::summary("a", FlowStatus::Ready)], Some(2)),
        fixtures::page(vec![fixtures::summary("b", FlowStatus::Ready)], Some(3)),
        fixtures::page(vec![fixtures::summary("c", FlowStatus::Ready)], Some(4)),
    ];
    let source = Arc::new(FakeFlowSource::new().with_pages(looping));
    let store = FlowStore::new(
        source.clone(),
        StoreOptions {
            max_list_pages: 2,
            ..StoreOptions::default()
        },
    );
    assert_eq!(store.list_flows().await.unwrap().len(), 2);
    assert_eq!(source.list_count(), 2);

    let cyclic = vec![fixtures::page(
        vec![fixtures::summary("a", FlowStatus::Ready)],
        Some(1),
    )];
    let source = Arc::new(FakeFlowSource::new().with_pages(cyclic));
    let store = store_with(source.clone());
    assert_eq!(store.list_flows().await.unwrap().len(), 1);
    assert_eq!(source.list_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_list_flows_evicts_expired_entries() {
    let source = Arc::new(
        FakeFlowSource::new()
            .with_flow(FlowBuilder::new("x").build())
            .with_pages(vec![fixtures::page(
                vec![fixtures::summary("x", FlowStatus::Expired)],
                None,
            )]),
    );
    let store = store_with(source.clone());
    store.resolve("x").await.unwrap();
    assert!(store.cache().get("x").await.is_some());

    store.list_flows().await.unwrap();

    assert!(store.cache().get("x").await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_list_flows_retries_transient_failures() {
    let source = Arc::new(FakeFlowSource::new().with_pages(vec![fixtures::page(
        vec![fixtures::summary("a", FlowStatus::Ready)],
        None,
    )]));
    source.push_failure(Error::Transient("502 Bad Gateway".to_string()));
    let store = store_with(source.clone());

    assert_eq!(store.list_flows().await.unwrap().len(), 1);
    assert_eq!(source.list_count(), 2);
}
