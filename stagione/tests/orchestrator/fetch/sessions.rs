use rust_decimal_macros::dec;

use stagione_mock::{MockBehavior, MockConnector};

use crate::helpers::{engine, pct_series, span};

#[tokio::test]
async fn session_is_established_once_across_fetches() {
    let provider = MockConnector::builder("provider")
        .default_behavior(MockBehavior::Series(pct_series(&[(2020, 1, dec!(1.00))])))
        .build();

    let (engine, _store) = engine(vec![provider.clone()]);
    for code in ["600000", "600001", "000002"] {
        let out = engine.fetch_series(code, span()).await;
        assert!(!out.is_empty());
    }

    assert_eq!(provider.series_call_count(), 3);
    assert_eq!(provider.login_count(), 1);
}

#[tokio::test]
async fn shutdown_tears_down_every_connector() {
    let a = MockConnector::builder("a").build();
    let b = MockConnector::builder("b").build();

    let (engine, _store) = engine(vec![a.clone(), b.clone()]);
    engine.fetch_series("600000", span()).await;

    engine.shutdown().await;
    assert_eq!(a.teardown_count(), 1);
    assert_eq!(b.teardown_count(), 1);

    // Teardown is idempotent.
    engine.shutdown().await;
    assert_eq!(a.teardown_count(), 2);
}

#[tokio::test]
async fn fetch_after_shutdown_opens_a_fresh_session() {
    let provider = MockConnector::builder("provider")
        .default_behavior(MockBehavior::Series(pct_series(&[(2020, 1, dec!(1.00))])))
        .build();

    let (engine, _store) = engine(vec![provider.clone()]);
    engine.fetch_series("600000", span()).await;
    engine.shutdown().await;
    engine.fetch_series("600000", span()).await;

    assert_eq!(provider.login_count(), 2);
}
