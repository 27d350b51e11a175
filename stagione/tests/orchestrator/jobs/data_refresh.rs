use chrono::{Datelike, Utc};
use rust_decimal_macros::dec;

use stagione::store::Store;
use stagione::{CatalogEntry, JobEvent, MonthPoint, RefreshOutcome};
use stagione_mock::{MockBehavior, MockConnector};

use crate::helpers::{catalog_entry, date, engine, month, pct_series, stock};

fn classified_entry(code: &str, name: &str, industry: &str) -> CatalogEntry {
    CatalogEntry {
        industry_name: Some(industry.to_owned()),
        ..catalog_entry(code, name)
    }
}

fn finished(events: Vec<JobEvent<RefreshOutcome>>) -> RefreshOutcome {
    match events.last() {
        Some(JobEvent::Finished(outcome)) => outcome.clone(),
        other => panic!("expected a finished terminal, got {other:?}"),
    }
}

#[tokio::test]
async fn refresh_populates_catalog_and_series() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![
            catalog_entry("600001", "Alpha Co"),
            catalog_entry("000002", "Beta Co"),
        ])
        .series_for(
            "600001",
            MockBehavior::Series(pct_series(&[(2023, 1, dec!(1.00)), (2023, 2, dec!(2.00))])),
        )
        .series_for(
            "000002",
            MockBehavior::Series(pct_series(&[(2023, 1, dec!(-1.00))])),
        )
        .build();

    let (engine, store) = engine(vec![provider]);
    let events = engine.clone().start_data_refresh(false).collect_all().await;
    let outcome = finished(events);

    assert_eq!(outcome.catalog_added, 2);
    assert_eq!(outcome.attempted, 2);
    assert_eq!(outcome.succeeded, 2);
    assert_eq!(outcome.failed, 0);
    assert_eq!(outcome.points_upserted, 3);

    let handle = store.acquire().await.unwrap();
    assert_eq!(handle.series("600001").await.unwrap().points().len(), 2);
    assert_eq!(handle.series("000002").await.unwrap().points().len(), 1);
}

#[tokio::test]
async fn refresh_derives_industries_and_links_stocks() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![
            classified_entry("600001", "Alpha Co", "Banking"),
            classified_entry("600002", "Beta Co", "Banking"),
            classified_entry("000003", "Gamma Co", "Mining"),
        ])
        .default_behavior(MockBehavior::Series(pct_series(&[(2023, 2, dec!(1.00))])))
        .build();

    let (engine, store) = engine(vec![provider]);
    let events = engine.clone().start_data_refresh(false).collect_all().await;
    finished(events);

    // Refresh alone populates the industry table from the catalog names.
    let industries = engine.industries().await.unwrap();
    assert_eq!(industries.len(), 2);
    let banking = industries.iter().find(|i| i.name == "Banking").unwrap();
    let mining = industries.iter().find(|i| i.name == "Mining").unwrap();
    assert_eq!(banking.level, 1);
    assert!(banking.parent_code.is_none());

    let handle = store.acquire().await.unwrap();
    assert_eq!(
        handle.stock_count_for_industry(&banking.code).await.unwrap(),
        2
    );
    assert_eq!(
        handle.stock_count_for_industry(&mining.code).await.unwrap(),
        1
    );
    let alpha = handle.stock("600001").await.unwrap().unwrap();
    assert_eq!(alpha.industry_code.as_deref(), Some(banking.code.as_str()));
    assert_eq!(alpha.industry_name.as_deref(), Some("Banking"));
    drop(handle);

    // A subsequent ranking walks the derived industries.
    let rx = engine.clone().start_bulk_ranking(month(2), 0, 10).unwrap();
    let ranked = rx.collect_all().await;
    let Some(JobEvent::Finished(outcome)) = ranked.last() else {
        panic!("expected a finished terminal");
    };
    assert_eq!(outcome.attempted, 2);
}

#[tokio::test]
async fn repeated_refresh_does_not_duplicate_derived_industries() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![classified_entry("600001", "Alpha Co", "Banking")])
        .default_behavior(MockBehavior::Series(pct_series(&[(2023, 2, dec!(1.00))])))
        .build();

    let (engine, _store) = engine(vec![provider]);
    let events = engine.clone().start_data_refresh(false).collect_all().await;
    finished(events);
    let events = engine.clone().start_data_refresh(false).collect_all().await;
    let outcome = finished(events);

    assert_eq!(outcome.catalog_added, 0);
    assert_eq!(engine.industries().await.unwrap().len(), 1);
}

#[tokio::test]
async fn incremental_refresh_resumes_after_the_latest_stored_point() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![catalog_entry("600001", "Alpha Co")])
        .series_for(
            "600001",
            MockBehavior::Series(pct_series(&[(2021, 4, dec!(1.00))])),
        )
        .build();

    let (engine, store) = engine(vec![provider.clone()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points(
            "600001",
            vec![
                MonthPoint::bare(2021, month(2)),
                MonthPoint::bare(2021, month(3)),
            ],
        )
        .await;

    let events = engine.clone().start_data_refresh(false).collect_all().await;
    let outcome = finished(events);
    assert_eq!(outcome.catalog_added, 0);
    assert_eq!(outcome.succeeded, 1);

    let spans = provider.recorded_spans().await;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].0, "600001");
    assert_eq!(spans[0].1.start, date(2021, 4, 1));
    assert_eq!(spans[0].1.end, Utc::now().date_naive());
}

#[tokio::test]
async fn december_resumption_rolls_into_the_next_year() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![catalog_entry("600001", "Alpha Co")])
        .series_for(
            "600001",
            MockBehavior::Series(pct_series(&[(2022, 1, dec!(1.00))])),
        )
        .build();

    let (engine, store) = engine(vec![provider.clone()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points("600001", vec![MonthPoint::bare(2021, month(12))])
        .await;

    let events = engine.clone().start_data_refresh(false).collect_all().await;
    finished(events);

    let spans = provider.recorded_spans().await;
    assert_eq!(spans[0].1.start, date(2022, 1, 1));
}

#[tokio::test]
async fn forced_refresh_restarts_from_the_listing_date() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![catalog_entry("600001", "Alpha Co")])
        .series_for(
            "600001",
            MockBehavior::Series(pct_series(&[(2023, 1, dec!(1.00))])),
        )
        .build();

    let (engine, store) = engine(vec![provider.clone()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points("600001", vec![MonthPoint::bare(2021, month(3))])
        .await;

    let events = engine.clone().start_data_refresh(true).collect_all().await;
    finished(events);

    let spans = provider.recorded_spans().await;
    // The stock fixture lists in January 2010.
    assert_eq!(spans[0].1.start, date(2010, 1, 1));
}

#[tokio::test]
async fn up_to_date_stock_is_skipped_but_counted_succeeded() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![catalog_entry("600001", "Alpha Co")])
        .build();

    let (engine, store) = engine(vec![provider.clone()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    let today = Utc::now().date_naive();
    let this_month = month(u8::try_from(today.month()).unwrap());
    store
        .insert_points("600001", vec![MonthPoint::bare(today.year(), this_month)])
        .await;

    let events = engine.clone().start_data_refresh(false).collect_all().await;
    let outcome = finished(events);

    assert_eq!(outcome.succeeded, 1);
    assert_eq!(outcome.points_upserted, 0);
    assert_eq!(provider.series_call_count(), 0);
}

#[tokio::test]
async fn stock_with_no_provider_rows_counts_as_failed() {
    let provider = MockConnector::builder("provider")
        .catalog(vec![catalog_entry("600001", "Alpha Co")])
        .default_behavior(MockBehavior::Empty)
        .build();

    let (engine, _store) = engine(vec![provider]);
    let events = engine.clone().start_data_refresh(false).collect_all().await;
    let outcome = finished(events);

    assert_eq!(outcome.attempted, 1);
    assert_eq!(outcome.failed, 1);
    assert_eq!(outcome.points_upserted, 0);
}

#[tokio::test]
async fn missing_catalog_capability_fails_the_job() {
    let provider = MockConnector::builder("provider").build();
    let (engine, _store) = engine(vec![provider]);

    let events = engine.clone().start_data_refresh(false).collect_all().await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], JobEvent::Failed { .. }));
}
