use rust_decimal_macros::dec;

use stagione::{MonthSet, StagioneError};
use stagione_mock::{MockBehavior, MockConnector};

use crate::helpers::{engine, industry, month, pct_series, stock};

#[tokio::test]
async fn unknown_industry_is_not_found() {
    let (engine, _store) = engine(vec![MockConnector::builder("provider").build()]);
    let err = engine
        .industry_seasonality("999999", None, 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, StagioneError::NotFound { .. }));
}

#[tokio::test]
async fn industry_without_index_code_resolves_none() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_industry(industry("801010", "Agriculture", None)).await;

    let out = engine
        .industry_seasonality("801010", None, 0, false)
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn industry_seasonality_measures_the_live_index_series() {
    let provider = MockConnector::builder("provider")
        .series_for(
            "801010.SI",
            MockBehavior::Series(pct_series(&[
                (2019, 2, dec!(1.00)),
                (2020, 2, dec!(2.00)),
                (2021, 2, dec!(-1.00)),
            ])),
        )
        .build();

    let (engine, store) = engine(vec![provider.clone()]);
    store
        .insert_industry(industry("801010", "Agriculture", Some("801010.SI")))
        .await;
    store.insert_stock(stock("600001", "Alpha", Some("801010"))).await;
    store.insert_stock(stock("600002", "Beta", Some("801010"))).await;
    store.insert_stock(stock("600003", "Gamma", Some("801020"))).await;

    let months = MonthSet::single(month(2));
    let out = engine
        .industry_seasonality("801010", Some(&months), 0, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(out.industry.code, "801010");
    assert_eq!(out.stock_count, 2);
    assert_eq!(out.report.stats().up_probability, dec!(66.67));
    assert_eq!(provider.series_call_count(), 1);
}

#[tokio::test]
async fn industry_with_no_provider_data_resolves_none() {
    let provider = MockConnector::builder("provider")
        .default_behavior(MockBehavior::Empty)
        .build();

    let (engine, store) = engine(vec![provider]);
    store
        .insert_industry(industry("801010", "Agriculture", Some("801010.SI")))
        .await;

    let out = engine
        .industry_seasonality("801010", None, 0, false)
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn industries_are_listed_by_code() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_industry(industry("801030", "Chemicals", None)).await;
    store.insert_industry(industry("801010", "Agriculture", None)).await;
    store.insert_industry(industry("801020", "Mining", None)).await;

    let listed = engine.industries().await.unwrap();
    let codes: Vec<&str> = listed.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, ["801010", "801020", "801030"]);
}
