use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entity::CatalogEntry;
use crate::error::StagioneError;
use crate::series::{DateSpan, MonthlySeries};

/// Focused role trait for connectors that provide monthly OHLCV series.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Fetch the monthly series for an entity code over the given span.
    ///
    /// `code` may name a stock or an index; providers that distinguish the
    /// two resolve it from the code shape. An `Ok` result with an empty
    /// series means the call was valid but yielded no rows.
    async fn monthly_series(
        &self,
        code: &str,
        span: DateSpan,
    ) -> Result<MonthlySeries, StagioneError>;
}

/// Focused role trait for connectors that can list the exchange catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full listing of stocks the provider knows about.
    async fn stock_catalog(&self) -> Result<Vec<CatalogEntry>, StagioneError>;
}

/// Focused role trait for connectors that resolve listing dates.
#[async_trait]
pub trait ListingDateProvider: Send + Sync {
    /// Resolve the first trading day of a stock, `Ok(None)` when the
    /// provider does not know it.
    async fn listing_date(&self, code: &str) -> Result<Option<NaiveDate>, StagioneError>;
}

/// The capability surface every data source implements.
///
/// Capabilities are advertised through the `as_*_provider` methods, which
/// return a usable trait object reference when supported. The orchestrator
/// probes these rather than downcasting.
///
/// Session lifecycle: connectors may lazily establish whatever session or
/// connection state they need on first use and must reuse it across calls.
/// [`teardown`](Self::teardown) releases that state and must be safe to
/// call repeatedly, including when no session was ever established.
#[async_trait]
pub trait StagioneConnector: Send + Sync {
    /// A stable identifier used in priority lists (e.g. "tushare").
    fn name(&self) -> &'static str;

    /// Human-friendly vendor string.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Whether this connector has the configuration it needs (credential,
    /// endpoint). Unconfigured connectors are skipped by the orchestrator;
    /// calling one directly yields [`StagioneError::NotConfigured`].
    fn configured(&self) -> bool {
        true
    }

    /// Release any live session state. Idempotent.
    async fn teardown(&self) {}

    /// Advertise monthly-series capability.
    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        None
    }

    /// Advertise catalog capability.
    fn as_catalog_provider(&self) -> Option<&dyn CatalogProvider> {
        None
    }

    /// Advertise listing-date capability.
    fn as_listing_date_provider(&self) -> Option<&dyn ListingDateProvider> {
        None
    }
}
