use rust_decimal_macros::dec;

use stagione::{Market, MonthPoint, MonthSet, SeasonalityReport, StagioneError};
use stagione_mock::MockConnector;

use crate::helpers::{date, engine, month, stock};

fn pct_point(year: i32, m: u8, pct: &str) -> MonthPoint {
    MonthPoint {
        pct_change: pct.parse().ok(),
        ..MonthPoint::bare(year, month(m))
    }
}

#[tokio::test]
async fn unknown_stock_is_not_found() {
    let (engine, _store) = engine(vec![MockConnector::builder("provider").build()]);
    let err = engine
        .stock_seasonality("999999", None, 0, false)
        .await
        .unwrap_err();
    assert!(matches!(err, StagioneError::NotFound { .. }));
}

#[tokio::test]
async fn stock_without_enough_data_resolves_none() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points("600001", vec![pct_point(2020, 2, "1.00")])
        .await;

    let out = engine
        .stock_seasonality("600001", None, 3, false)
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn stock_seasonality_carries_identity_and_stats() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points(
            "600001",
            vec![
                pct_point(2019, 2, "1.50"),
                pct_point(2020, 2, "2.50"),
                pct_point(2021, 2, "-1.00"),
            ],
        )
        .await;

    let months = MonthSet::single(month(2));
    let out = engine
        .stock_seasonality("600001", Some(&months), 0, false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(out.code, "600001");
    assert_eq!(out.name, "Alpha Co");
    assert_eq!(out.market, Market::Sh);
    assert_eq!(out.listing_date, Some(date(2010, 1, 1)));

    let stats = out.report.stats();
    assert_eq!(stats.total_count, 3);
    assert_eq!(stats.up_count, 2);
    assert_eq!(stats.up_probability, dec!(66.67));
    assert_eq!(stats.avg_up_pct, dec!(2.00));
    assert_eq!(stats.year_range, (2019, 2021));
}

#[tokio::test]
async fn per_month_query_breaks_stats_down() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store
        .insert_points(
            "600001",
            vec![
                pct_point(2019, 2, "1.00"),
                pct_point(2019, 3, "-1.00"),
                pct_point(2020, 2, "2.00"),
                pct_point(2020, 3, "-2.00"),
            ],
        )
        .await;

    let out = engine
        .stock_seasonality("600001", None, 0, true)
        .await
        .unwrap()
        .unwrap();

    let SeasonalityReport::PerMonth { stats, by_month } = &out.report else {
        panic!("expected a per-month report");
    };
    assert_eq!(stats.total_count, 4);
    assert_eq!(by_month.len(), 2);
    assert_eq!(by_month[&month(2)].up_probability, dec!(100.00));
    assert_eq!(by_month[&month(3)].down_probability, dec!(100.00));
}

#[tokio::test]
async fn suggestions_match_code_or_name_and_validate_input() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600519", "Kweichow Moutai", None)).await;
    store.insert_stock(stock("600036", "Merchants Bank", None)).await;
    store.insert_stock(stock("000858", "Wuliangye", None)).await;

    let by_code = engine.stock_suggestions("600", 10).await.unwrap();
    assert_eq!(by_code.len(), 2);

    let by_name = engine.stock_suggestions("moutai", 10).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].code, "600519");

    let limited = engine.stock_suggestions("0", 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    assert!(matches!(
        engine.stock_suggestions("  ", 10).await,
        Err(StagioneError::InvalidArg(_))
    ));
    assert!(matches!(
        engine.stock_suggestions("600519", 0).await,
        Err(StagioneError::InvalidArg(_))
    ));
}
