//! Bulk job coordination: industry ranking and data refresh.
//!
//! Each job runs on its own task and owns the producer half of a progress
//! channel. Entities are processed strictly in order, one progress event
//! announced per entity before its work starts, each entity's fetch plus
//! aggregation bounded as a whole, and one terminal event always closes
//! the stream. Provider sessions are torn down on every exit path.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use stagione_core::{
    CatalogEntry, DateSpan, Industry, IndustryRanking, Month, MonthSet, RankOutcome,
    RefreshOutcome, SourceConfig, StagioneError, Stock, summarize,
};

use crate::bounded::{self, Bounded};
use crate::core::Stagione;
use crate::progress::{self, ProgressReceiver, ProgressSender};
use crate::query::full_span;
use crate::store::{StockFilter, StoreLease};

// Pace of catalog-phase progress events during refresh.
const CATALOG_TICK: usize = 200;

impl Stagione {
    /// Start a bulk ranking of all industries by up-probability in
    /// `month`.
    ///
    /// The job runs on its own task; consume the returned receiver for
    /// progress and the terminal outcome. Dropping the receiver orphans
    /// the job but does not stop it: store writes and session teardown
    /// still complete. The receiver takes a shared handle
    /// (`Arc<Stagione>`); clone the `Arc` to keep one.
    ///
    /// # Errors
    /// `InvalidArg` for a zero `limit`; later failures surface as a
    /// `Failed` terminal event instead.
    pub fn start_bulk_ranking(
        self: Arc<Self>,
        month: Month,
        min_total_count: u32,
        limit: usize,
    ) -> Result<ProgressReceiver<RankOutcome>, StagioneError> {
        if limit == 0 {
            return Err(StagioneError::InvalidArg(
                "ranking limit must be positive".to_owned(),
            ));
        }
        let (tx, rx) = progress::channel();
        tokio::spawn(async move {
            let cfg = self.config().await;
            let result =
                Self::rank_industries(&self, &cfg, month, min_total_count, limit, &tx).await;
            self.shutdown().await;
            match result {
                Ok(outcome) => tx.finish(outcome),
                Err(message) => tx.fail(message),
            }
        });
        Ok(rx)
    }

    /// Start a refresh of the stock catalog and all monthly series.
    ///
    /// With `force` set, every stock is re-fetched from its listing date;
    /// otherwise each resumes from the month after its newest stored
    /// point. Same task and channel semantics as
    /// [`start_bulk_ranking`](Self::start_bulk_ranking).
    #[must_use]
    pub fn start_data_refresh(self: Arc<Self>, force: bool) -> ProgressReceiver<RefreshOutcome> {
        let (tx, rx) = progress::channel();
        tokio::spawn(async move {
            let cfg = self.config().await;
            let result = Self::refresh_monthly_data(&self, &cfg, force, &tx).await;
            self.shutdown().await;
            match result {
                Ok(outcome) => tx.finish(outcome),
                Err(message) => tx.fail(message),
            }
        });
        rx
    }

    async fn rank_industries(
        this: &Arc<Self>,
        cfg: &SourceConfig,
        month: Month,
        min_total_count: u32,
        limit: usize,
        tx: &ProgressSender<RankOutcome>,
    ) -> Result<RankOutcome, String> {
        let mut lease = StoreLease::new(Arc::clone(&this.store), cfg.store_lease_ops);
        let industries = lease
            .handle()
            .await
            .map_err(|e| format!("could not open store: {e}"))?
            .industries()
            .await
            .map_err(|e| format!("could not load industries: {e}"))?;

        let total = industries.len();
        tx.progress(0, total, "ranking industries");

        let mut rows: Vec<(usize, IndustryRanking)> = Vec::new();
        let mut succeeded = 0;
        let mut failed = 0;
        for (idx, industry) in industries.into_iter().enumerate() {
            tx.progress(idx + 1, total, format!("querying {}", industry.name));

            let Some(index_code) = industry.index_code.clone() else {
                warn!(industry = %industry.code, "no index code; counting as failed");
                failed += 1;
                continue;
            };

            let work = {
                let worker = Arc::clone(this);
                let months = MonthSet::single(month);
                async move {
                    let series = worker.fetch_series(&index_code, full_span()).await;
                    summarize(&series, Some(&months), min_total_count, false)
                }
            };
            match bounded::run(cfg.entity_timeout, work).await {
                Bounded::Completed(Some(report)) => {
                    let stock_count = this
                        .industry_member_count(&mut lease, &industry.code)
                        .await;
                    rows.push((
                        idx,
                        IndustryRanking {
                            industry,
                            stock_count,
                            stats: report.stats().clone(),
                        },
                    ));
                    succeeded += 1;
                }
                Bounded::Completed(None) => {
                    debug!(industry = %industry.code, "no qualifying data");
                    failed += 1;
                }
                Bounded::TimedOut => {
                    warn!(industry = %industry.code, "entity timed out");
                    failed += 1;
                }
            }
        }

        // Up-probability descending; ties keep the store's industry order.
        rows.sort_by_key(|(idx, r)| (Reverse(r.stats.up_probability), *idx));
        let rankings = rows.into_iter().map(|(_, r)| r).take(limit).collect();

        Ok(RankOutcome {
            rankings,
            attempted: total,
            succeeded,
            failed,
        })
    }

    async fn industry_member_count(&self, lease: &mut StoreLease, industry_code: &str) -> u64 {
        let counted = match lease.handle().await {
            Ok(h) => h.stock_count_for_industry(industry_code).await,
            Err(e) => Err(e),
        };
        counted.unwrap_or_else(|e| {
            warn!(industry = %industry_code, error = %e, "member count unavailable");
            0
        })
    }

    async fn refresh_monthly_data(
        this: &Arc<Self>,
        cfg: &SourceConfig,
        force: bool,
        tx: &ProgressSender<RefreshOutcome>,
    ) -> Result<RefreshOutcome, String> {
        let catalog = this
            .fetch_catalog()
            .await
            .map_err(|e| format!("could not fetch stock catalog: {e}"))?;

        let mut lease = StoreLease::new(Arc::clone(&this.store), cfg.store_lease_ops);
        let mut catalog_added = 0;
        let mut industries_added = 0;
        for (i, entry) in catalog.iter().enumerate() {
            if i % CATALOG_TICK == 0 {
                tx.progress(i, catalog.len(), "updating stock catalog");
            }
            let handle = lease
                .handle()
                .await
                .map_err(|e| format!("could not open store: {e}"))?;
            if let Some(industry) = industry_from_catalog(entry) {
                match handle.upsert_industry(industry).await {
                    Ok(true) => industries_added += 1,
                    Ok(false) => {}
                    Err(e) => warn!(code = %entry.code, error = %e, "industry upsert failed"),
                }
            }
            match handle.upsert_stock(stock_from_catalog(entry)).await {
                Ok(true) => catalog_added += 1,
                Ok(false) => {}
                Err(e) => warn!(code = %entry.code, error = %e, "catalog upsert failed"),
            }
        }
        info!(catalog_added, industries_added, "stock catalog updated");

        let stocks = lease
            .handle()
            .await
            .map_err(|e| format!("could not open store: {e}"))?
            .stocks(&StockFilter::default())
            .await
            .map_err(|e| format!("could not list stocks: {e}"))?;

        let total = stocks.len();
        let today = Utc::now().date_naive();
        let mut points_upserted = 0;
        let mut succeeded = 0;
        let mut failed = 0;
        for (idx, stock) in stocks.into_iter().enumerate() {
            tx.progress(
                idx + 1,
                total,
                format!("refreshing {} {}", stock.code, stock.name),
            );

            let latest = if force {
                None
            } else {
                match lease.handle().await {
                    Ok(h) => h.latest_point(&stock.code).await.unwrap_or_else(|e| {
                        warn!(code = %stock.code, error = %e, "latest point unavailable");
                        None
                    }),
                    Err(e) => return Err(format!("could not open store: {e}")),
                }
            };
            let Some(start) = this.refresh_start(&stock, latest).await else {
                failed += 1;
                continue;
            };
            if start > today {
                // Nothing new can exist yet.
                succeeded += 1;
                continue;
            }
            let span = DateSpan { start, end: today };

            let work = {
                let worker = Arc::clone(this);
                let code = stock.code.clone();
                async move { worker.fetch_series(&code, span).await }
            };
            match bounded::run(cfg.entity_timeout, work).await {
                Bounded::Completed(series) if !series.is_empty() => {
                    let handle = lease
                        .handle()
                        .await
                        .map_err(|e| format!("could not open store: {e}"))?;
                    match handle.upsert_points(&stock.code, series.points()).await {
                        Ok(added) => {
                            points_upserted += added;
                            succeeded += 1;
                        }
                        Err(e) => {
                            warn!(code = %stock.code, error = %e, "point upsert failed");
                            failed += 1;
                        }
                    }
                }
                Bounded::Completed(_) => {
                    debug!(code = %stock.code, "no rows from any provider");
                    failed += 1;
                }
                Bounded::TimedOut => {
                    warn!(code = %stock.code, "entity timed out");
                    failed += 1;
                }
            }
        }

        Ok(RefreshOutcome {
            catalog_added,
            points_upserted,
            attempted: total,
            succeeded,
            failed,
        })
    }

    /// First day to fetch for a stock: the month after its newest stored
    /// point, else its listing date, resolved live as a last resort.
    /// `None` when no start can be determined.
    async fn refresh_start(
        &self,
        stock: &Stock,
        latest: Option<(i32, Month)>,
    ) -> Option<chrono::NaiveDate> {
        if let Some((year, month)) = latest {
            let next_year = if month.get() == 12 { year + 1 } else { year };
            return month.succ().first_day(next_year);
        }
        if let Some(date) = stock.listing_date {
            return Some(date);
        }
        let fetched = self.fetch_listing_date(&stock.code).await;
        if fetched.is_none() {
            warn!(code = %stock.code, "no listing date resolvable");
        }
        fetched
    }
}

fn stock_from_catalog(entry: &CatalogEntry) -> Stock {
    Stock {
        code: entry.code.clone(),
        name: entry.name.clone(),
        market: entry.market,
        listing_date: entry.listing_date,
        industry_code: entry
            .industry_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(derived_industry_code),
        industry_name: entry.industry_name.clone(),
        delisted: false,
    }
}

/// A level-1 industry record derived from a catalog entry's industry name,
/// so rankings and member counts work on a store populated only by refresh.
/// `None` when the entry carries no industry name.
fn industry_from_catalog(entry: &CatalogEntry) -> Option<Industry> {
    let name = entry.industry_name.as_deref()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(Industry {
        code: derived_industry_code(name),
        name: name.to_owned(),
        level: 1,
        parent_code: None,
        index_code: None,
    })
}

/// Deterministic 16-hex-digit code for an industry name (FNV-1a, 64-bit).
/// Catalog providers hand out names only, so the code must be derivable
/// from the name alone and stable across refreshes.
fn derived_industry_code(name: &str) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for byte in name.trim().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}
