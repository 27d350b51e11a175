use std::sync::Arc;
use std::time::Duration;

use rust_decimal_macros::dec;
use tokio::time::Instant;

use stagione::{MemoryStore, Stagione};
use stagione_mock::{MockBehavior, MockConnector};

use crate::helpers::{pct_series, span};

fn timed_engine(connectors: Vec<Arc<MockConnector>>, ceiling: Duration) -> Arc<Stagione> {
    let mut builder = Stagione::builder()
        .with_store(Arc::new(MemoryStore::new()))
        .provider_timeout(ceiling);
    for c in connectors {
        builder = builder.with_connector(c);
    }
    Arc::new(builder.build().unwrap())
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_yields_to_the_next_after_one_ceiling() {
    let stalled = MockConnector::builder("stalled")
        .default_behavior(MockBehavior::Hang)
        .build();
    let rows = pct_series(&[(2020, 1, dec!(1.00))]);
    let backup = MockConnector::builder("backup")
        .default_behavior(MockBehavior::Series(rows.clone()))
        .build();

    let engine = timed_engine(vec![stalled.clone(), backup], Duration::from_secs(2));
    let started = Instant::now();
    let out = engine.fetch_series("600000", span()).await;

    assert_eq!(out, rows);
    // The stalled call is abandoned at exactly the ceiling, never awaited
    // further.
    assert_eq!(started.elapsed(), Duration::from_secs(2));
    assert_eq!(stalled.series_call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_under_the_ceiling_still_wins() {
    let rows = pct_series(&[(2020, 1, dec!(1.00))]);
    let slow = MockConnector::builder("slow")
        .delay(Duration::from_secs(1))
        .default_behavior(MockBehavior::Series(rows.clone()))
        .build();
    let backup = MockConnector::builder("backup")
        .default_behavior(MockBehavior::Series(pct_series(&[(2020, 1, dec!(9.00))])))
        .build();

    let engine = timed_engine(vec![slow, backup.clone()], Duration::from_secs(2));
    let started = Instant::now();
    let out = engine.fetch_series("600000", span()).await;

    assert_eq!(out, rows);
    assert_eq!(started.elapsed(), Duration::from_secs(1));
    assert_eq!(backup.series_call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn every_source_stalling_resolves_empty_after_two_ceilings() {
    let first = MockConnector::builder("first")
        .default_behavior(MockBehavior::Hang)
        .build();
    let second = MockConnector::builder("second")
        .default_behavior(MockBehavior::Hang)
        .build();

    let engine = timed_engine(vec![first, second], Duration::from_secs(2));
    let started = Instant::now();
    let out = engine.fetch_series("600000", span()).await;

    assert!(out.is_empty());
    assert_eq!(started.elapsed(), Duration::from_secs(4));
}
