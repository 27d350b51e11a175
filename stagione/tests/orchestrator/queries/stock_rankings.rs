use rust_decimal_macros::dec;

use stagione::{Market, MonthPoint, MonthSet, StagioneError, StockFilter};
use stagione_mock::MockConnector;

use crate::helpers::{engine, month, stock};

fn pct_point(year: i32, m: u8, pct: &str) -> MonthPoint {
    MonthPoint {
        pct_change: pct.parse().ok(),
        ..MonthPoint::bare(year, month(m))
    }
}

#[tokio::test]
async fn rankings_sort_by_up_probability_and_truncate() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    store.insert_stock(stock("600002", "Beta Co", None)).await;
    store.insert_stock(stock("000003", "Gamma Co", None)).await;
    store
        .insert_points(
            "600001",
            vec![
                pct_point(2019, 2, "1.00"),
                pct_point(2020, 2, "2.00"),
                pct_point(2021, 2, "-1.00"),
            ],
        )
        .await;
    store
        .insert_points(
            "600002",
            vec![pct_point(2019, 2, "1.00"), pct_point(2020, 2, "2.00")],
        )
        .await;
    store
        .insert_points(
            "000003",
            vec![
                pct_point(2019, 2, "-1.00"),
                pct_point(2020, 2, "1.00"),
                pct_point(2021, 2, "-2.00"),
            ],
        )
        .await;

    let months = MonthSet::single(month(2));
    let ranked = engine
        .stock_rankings(&StockFilter::default(), Some(&months), 0, 2)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].code, "600002");
    assert_eq!(ranked[0].report.stats().up_probability, dec!(100.00));
    assert_eq!(ranked[1].code, "600001");
    assert_eq!(ranked[1].report.stats().up_probability, dec!(66.67));
}

#[tokio::test]
async fn rankings_respect_filter_floor_and_delisting() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600001", "Alpha Co", Some("801010"))).await;
    store.insert_stock(stock("600002", "Beta Co", Some("801020"))).await;
    store.insert_stock(stock("000003", "Gamma Co", Some("801010"))).await;
    let mut gone = stock("600004", "Delta Co", Some("801010"));
    gone.delisted = true;
    store.insert_stock(gone).await;
    for code in ["600001", "600002", "000003", "600004"] {
        store
            .insert_points(
                code,
                vec![pct_point(2019, 2, "1.00"), pct_point(2020, 2, "1.00")],
            )
            .await;
    }

    let filter = StockFilter {
        market: Some(Market::Sh),
        industry_code: Some("801010".to_owned()),
        ..StockFilter::default()
    };
    let months = MonthSet::single(month(2));
    let ranked = engine
        .stock_rankings(&filter, Some(&months), 0, 10)
        .await
        .unwrap();
    let codes: Vec<&str> = ranked.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, ["600001"]);

    let floored = engine
        .stock_rankings(&filter, Some(&months), 3, 10)
        .await
        .unwrap();
    assert!(floored.is_empty());
}

#[tokio::test]
async fn equal_probabilities_keep_store_order() {
    let (engine, store) = engine(vec![MockConnector::builder("provider").build()]);
    store.insert_stock(stock("600002", "Beta Co", None)).await;
    store.insert_stock(stock("600001", "Alpha Co", None)).await;
    for code in ["600001", "600002"] {
        store
            .insert_points(
                code,
                vec![pct_point(2019, 2, "1.00"), pct_point(2020, 2, "2.00")],
            )
            .await;
    }

    let ranked = engine
        .stock_rankings(&StockFilter::default(), None, 0, 10)
        .await
        .unwrap();

    // The store lists stocks by code, so ties resolve 600001 before 600002.
    let codes: Vec<&str> = ranked.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(codes, ["600001", "600002"]);
}

#[tokio::test]
async fn zero_limit_is_rejected_up_front() {
    let (engine, _store) = engine(vec![MockConnector::builder("provider").build()]);
    let err = engine
        .stock_rankings(&StockFilter::default(), None, 0, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, StagioneError::InvalidArg(_)));
}
