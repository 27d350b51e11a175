//! Source orchestration: priority-ordered failover across providers.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use stagione_core::{CatalogEntry, DateSpan, MonthlySeries, StagioneError};

use crate::bounded::{self, Bounded};
use crate::core::Stagione;

impl Stagione {
    /// Fetch the monthly series for `code`, trying providers in priority
    /// order.
    ///
    /// Behavior:
    /// - Disabled and unconfigured providers are skipped without a call.
    /// - A provider error, timeout, or empty result moves on to the next
    ///   provider; the first non-empty series is returned unmodified.
    /// - This operation never fails: when every source is exhausted it
    ///   resolves to an empty series, and the caller decides what absence
    ///   means.
    pub async fn fetch_series(&self, code: &str, span: DateSpan) -> MonthlySeries {
        let cfg = self.config().await;
        for conn in self.eligible(&cfg) {
            if conn.as_series_provider().is_none() {
                continue;
            }
            let provider = conn.name();
            let fut = {
                let conn = Arc::clone(&conn);
                let code = code.to_owned();
                async move {
                    conn.as_series_provider()
                        .expect("checked is_some above")
                        .monthly_series(&code, span)
                        .await
                }
            };
            match bounded::run(cfg.provider_timeout, fut).await {
                Bounded::Completed(Ok(series)) if !series.is_empty() => {
                    debug!(provider, code, points = series.len(), "series fetched");
                    return series;
                }
                Bounded::Completed(Ok(_)) => {
                    debug!(provider, code, "no rows; trying next provider");
                }
                Bounded::Completed(Err(e)) => {
                    warn!(provider, code, error = %e, "provider failed; trying next");
                }
                Bounded::TimedOut => {
                    warn!(provider, code, "provider timed out; trying next");
                }
            }
        }
        info!(code, "no provider produced a series");
        MonthlySeries::empty()
    }

    /// Fetch the exchange stock catalog, trying providers in priority
    /// order.
    ///
    /// # Errors
    /// `NotFound` when no eligible provider produces a non-empty catalog;
    /// unlike series acquisition there is no useful empty fallback here,
    /// since a refresh job cannot start without a catalog.
    pub async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, StagioneError> {
        let cfg = self.config().await;
        for conn in self.eligible(&cfg) {
            if conn.as_catalog_provider().is_none() {
                continue;
            }
            let provider = conn.name();
            let fut = {
                let conn = Arc::clone(&conn);
                async move {
                    conn.as_catalog_provider()
                        .expect("checked is_some above")
                        .stock_catalog()
                        .await
                }
            };
            match bounded::run(cfg.provider_timeout, fut).await {
                Bounded::Completed(Ok(entries)) if !entries.is_empty() => {
                    debug!(provider, entries = entries.len(), "catalog fetched");
                    return Ok(entries);
                }
                Bounded::Completed(Ok(_)) => {
                    debug!(provider, "empty catalog; trying next provider");
                }
                Bounded::Completed(Err(e)) => {
                    warn!(provider, error = %e, "catalog fetch failed; trying next");
                }
                Bounded::TimedOut => {
                    warn!(provider, "catalog fetch timed out; trying next");
                }
            }
        }
        Err(StagioneError::not_found("stock catalog"))
    }

    /// Resolve a stock's listing date, trying providers in priority order.
    /// Resolves to `None` when no provider knows it.
    pub async fn fetch_listing_date(&self, code: &str) -> Option<NaiveDate> {
        let cfg = self.config().await;
        for conn in self.eligible(&cfg) {
            if conn.as_listing_date_provider().is_none() {
                continue;
            }
            let provider = conn.name();
            let fut = {
                let conn = Arc::clone(&conn);
                let code = code.to_owned();
                async move {
                    conn.as_listing_date_provider()
                        .expect("checked is_some above")
                        .listing_date(&code)
                        .await
                }
            };
            match bounded::run(cfg.provider_timeout, fut).await {
                Bounded::Completed(Ok(Some(date))) => return Some(date),
                Bounded::Completed(Ok(None)) => {
                    debug!(provider, code, "listing date unknown; trying next");
                }
                Bounded::Completed(Err(e)) => {
                    warn!(provider, code, error = %e, "listing date fetch failed; trying next");
                }
                Bounded::TimedOut => {
                    warn!(provider, code, "listing date fetch timed out; trying next");
                }
            }
        }
        None
    }
}
