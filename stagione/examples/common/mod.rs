use std::sync::Arc;

use rust_decimal_macros::dec;

use stagione::{CatalogEntry, Market, MonthPoint, MonthlySeries, StagioneConnector};
use stagione_mock::{MockBehavior, MockConnector};

/// A real Tushare connector when a token is available, else a scripted
/// mock so the examples run offline.
#[must_use]
pub fn get_connector() -> Arc<dyn StagioneConnector> {
    if let Ok(token) = std::env::var("TUSHARE_TOKEN") {
        Arc::new(
            stagione_tushare::TushareConnector::builder()
                .token(token)
                .build(),
        )
    } else {
        println!("--- (TUSHARE_TOKEN not set; using a scripted offline source) ---");
        scripted_mock()
    }
}

fn scripted_mock() -> Arc<dyn StagioneConnector> {
    MockConnector::builder("offline")
        .catalog(vec![
            entry("600519", "Kweichow Moutai"),
            entry("000858", "Wuliangye"),
        ])
        .series_for("600519", MockBehavior::Series(demo_series()))
        .series_for("000858", MockBehavior::Series(demo_series()))
        .series_for("801120.SI", MockBehavior::Series(demo_series()))
        .build()
}

fn entry(code: &str, name: &str) -> CatalogEntry {
    CatalogEntry {
        code: code.to_owned(),
        name: name.to_owned(),
        market: Market::infer(code),
        listing_date: chrono::NaiveDate::from_ymd_opt(2001, 8, 27),
        industry_name: Some("Beverages".to_owned()),
    }
}

fn demo_series() -> MonthlySeries {
    let mut points = Vec::new();
    for year in 2019..=2023 {
        for (m, pct) in [(1, dec!(2.40)), (2, dec!(5.10)), (3, dec!(-1.70))] {
            let month = stagione::Month::new(m).expect("static month literal");
            points.push(MonthPoint {
                pct_change: Some(pct + rust_decimal::Decimal::from(year % 3)),
                ..MonthPoint::bare(year, month)
            });
        }
    }
    MonthlySeries::build(points)
}
