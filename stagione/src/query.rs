//! Store-backed query surfaces: single entities and ranked listings.

use std::cmp::Reverse;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use stagione_core::{
    DateSpan, Industry, Market, MonthSet, SeasonalityReport, StagioneError, Stock, summarize,
};

use crate::core::Stagione;
use crate::store::StockFilter;

/// Seasonality report for one stock, with its identity attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockSeasonality {
    /// Bare numeric code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Exchange the stock trades on.
    pub market: Market,
    /// First trading day, when known.
    pub listing_date: Option<NaiveDate>,
    /// The computed report.
    pub report: SeasonalityReport,
}

/// Seasonality report for one industry's index, with member count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndustrySeasonality {
    /// The measured industry.
    pub industry: Industry,
    /// Number of member stocks in the store.
    pub stock_count: u64,
    /// The computed report.
    pub report: SeasonalityReport,
}

/// The widest span queried from providers: early 2000 through today.
pub(crate) fn full_span() -> DateSpan {
    DateSpan {
        start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
        end: Utc::now().date_naive(),
    }
}

impl Stagione {
    /// Seasonality of one stock from its stored series.
    ///
    /// Returns `Ok(None)` when the stock exists but its data cannot meet
    /// the floor (or produces no contributing months); an unknown code is
    /// `NotFound`.
    ///
    /// # Errors
    /// `NotFound` for an unknown code; store errors pass through.
    pub async fn stock_seasonality(
        &self,
        code: &str,
        months: Option<&MonthSet>,
        min_total_count: u32,
        per_month: bool,
    ) -> Result<Option<StockSeasonality>, StagioneError> {
        let handle = self.store.acquire().await?;
        let stock = handle
            .stock(code)
            .await?
            .ok_or_else(|| StagioneError::not_found(format!("stock {code}")))?;
        let series = handle.series(code).await?;
        Ok(
            summarize(&series, months, min_total_count, per_month).map(|report| {
                StockSeasonality {
                    code: stock.code,
                    name: stock.name,
                    market: stock.market,
                    listing_date: stock.listing_date,
                    report,
                }
            }),
        )
    }

    /// Seasonality of one industry, measured on its index series fetched
    /// live from the providers.
    ///
    /// Returns `Ok(None)` when the industry has no index code, the
    /// providers produce no series, or the floor is not met; an unknown
    /// industry code is `NotFound`.
    ///
    /// # Errors
    /// `NotFound` for an unknown industry code; store errors pass through.
    pub async fn industry_seasonality(
        &self,
        industry_code: &str,
        months: Option<&MonthSet>,
        min_total_count: u32,
        per_month: bool,
    ) -> Result<Option<IndustrySeasonality>, StagioneError> {
        let handle = self.store.acquire().await?;
        let industry = handle
            .industry(industry_code)
            .await?
            .ok_or_else(|| StagioneError::not_found(format!("industry {industry_code}")))?;
        let Some(index_code) = industry.index_code.clone() else {
            warn!(industry = %industry.code, "industry has no index code");
            return Ok(None);
        };
        let stock_count = handle.stock_count_for_industry(&industry.code).await?;
        drop(handle);

        let series = self.fetch_series(&index_code, full_span()).await;
        Ok(
            summarize(&series, months, min_total_count, per_month).map(|report| {
                IndustrySeasonality {
                    industry,
                    stock_count,
                    report,
                }
            }),
        )
    }

    /// Stored stocks matching `filter`, summarized and ranked by
    /// up-probability descending, truncated to `limit`.
    ///
    /// Stocks whose data cannot meet the floor (or that produce no
    /// contributing months) are left out; ties keep the store's stock
    /// order.
    ///
    /// # Errors
    /// `InvalidArg` for a zero limit; store errors pass through.
    pub async fn stock_rankings(
        &self,
        filter: &StockFilter,
        months: Option<&MonthSet>,
        min_total_count: u32,
        limit: usize,
    ) -> Result<Vec<StockSeasonality>, StagioneError> {
        if limit == 0 {
            return Err(StagioneError::InvalidArg(
                "ranking limit must be positive".to_owned(),
            ));
        }
        let handle = self.store.acquire().await?;
        let stocks = handle.stocks(filter).await?;

        let mut rows: Vec<(usize, StockSeasonality)> = Vec::new();
        for (idx, stock) in stocks.into_iter().enumerate() {
            let series = handle.series(&stock.code).await?;
            if let Some(report) = summarize(&series, months, min_total_count, false) {
                rows.push((
                    idx,
                    StockSeasonality {
                        code: stock.code,
                        name: stock.name,
                        market: stock.market,
                        listing_date: stock.listing_date,
                        report,
                    },
                ));
            }
        }

        rows.sort_by_key(|(idx, r)| (Reverse(r.report.stats().up_probability), *idx));
        Ok(rows.into_iter().map(|(_, r)| r).take(limit).collect())
    }

    /// Stocks whose code or name matches `keyword`, for typeahead.
    ///
    /// # Errors
    /// `InvalidArg` for an empty keyword or zero limit; store errors pass
    /// through.
    pub async fn stock_suggestions(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<Stock>, StagioneError> {
        if keyword.trim().is_empty() {
            return Err(StagioneError::InvalidArg(
                "suggestion keyword must not be empty".to_owned(),
            ));
        }
        if limit == 0 {
            return Err(StagioneError::InvalidArg(
                "suggestion limit must be positive".to_owned(),
            ));
        }
        let handle = self.store.acquire().await?;
        handle.suggest(keyword.trim(), limit).await
    }

    /// All industries known to the store, ordered by code.
    ///
    /// # Errors
    /// Store errors pass through.
    pub async fn industries(&self) -> Result<Vec<Industry>, StagioneError> {
        let handle = self.store.acquire().await?;
        handle.industries().await
    }
}
