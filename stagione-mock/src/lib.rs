//! stagione-mock
//!
//! A scripted [`StagioneConnector`] for tests and examples. Behavior is
//! configured per entity code through a builder; the connector records
//! calls, requested spans, and session activity so tests can assert on
//! orchestrator behavior from the outside.
#![warn(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};

use stagione_core::{
    CatalogEntry, CatalogProvider, DateSpan, ListingDateProvider, MonthlySeries, SeriesProvider,
    StagioneConnector, StagioneError,
};

/// Instruction for how a series call should behave for a given code.
#[derive(Clone)]
pub enum MockBehavior {
    /// Return the provided series immediately.
    Series(MonthlySeries),
    /// Return an empty series (a valid call with zero rows).
    Empty,
    /// Fail immediately with the provided error.
    Fail(StagioneError),
    /// Hang indefinitely (simulate a stalled upstream).
    Hang,
}

#[derive(Default)]
struct CallLog {
    spans: Vec<(String, DateSpan)>,
}

/// Scripted connector with observable call and session counters.
pub struct MockConnector {
    name: &'static str,
    configured: bool,
    delay: Option<Duration>,
    series_rules: HashMap<String, MockBehavior>,
    default_behavior: MockBehavior,
    catalog: Option<Vec<CatalogEntry>>,
    listing_dates: HashMap<String, NaiveDate>,

    session_active: Mutex<bool>,
    logins: AtomicUsize,
    teardowns: AtomicUsize,
    series_calls: AtomicUsize,
    log: Mutex<CallLog>,
}

impl MockConnector {
    /// Start building a mock with the given connector name.
    #[must_use]
    pub fn builder(name: &'static str) -> MockConnectorBuilder {
        MockConnectorBuilder {
            name,
            configured: true,
            delay: None,
            series_rules: HashMap::new(),
            default_behavior: MockBehavior::Empty,
            catalog: None,
            listing_dates: HashMap::new(),
        }
    }

    /// Number of sessions established so far.
    #[must_use]
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    /// Number of teardown calls observed.
    #[must_use]
    pub fn teardown_count(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    /// Number of series calls observed.
    #[must_use]
    pub fn series_call_count(&self) -> usize {
        self.series_calls.load(Ordering::SeqCst)
    }

    /// The `(code, span)` pairs of every series call, in order.
    pub async fn recorded_spans(&self) -> Vec<(String, DateSpan)> {
        self.log.lock().await.spans.clone()
    }

    /// Establish a session on first use; later calls reuse it.
    async fn ensure_session(&self) {
        let mut active = self.session_active.lock().await;
        if !*active {
            *active = true;
            self.logins.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl StagioneConnector for MockConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "mock"
    }

    fn configured(&self) -> bool {
        self.configured
    }

    async fn teardown(&self) {
        let mut active = self.session_active.lock().await;
        *active = false;
        self.teardowns.fetch_add(1, Ordering::SeqCst);
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self)
    }

    fn as_catalog_provider(&self) -> Option<&dyn CatalogProvider> {
        self.catalog.as_ref().map(|_| self as &dyn CatalogProvider)
    }

    fn as_listing_date_provider(&self) -> Option<&dyn ListingDateProvider> {
        Some(self)
    }
}

#[async_trait]
impl SeriesProvider for MockConnector {
    async fn monthly_series(
        &self,
        code: &str,
        span: DateSpan,
    ) -> Result<MonthlySeries, StagioneError> {
        if !self.configured {
            return Err(StagioneError::not_configured(self.name));
        }
        self.ensure_session().await;
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().await.spans.push((code.to_owned(), span));

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        let behavior = self.series_rules.get(code).unwrap_or(&self.default_behavior);
        match behavior {
            MockBehavior::Series(series) => Ok(series.clone()),
            MockBehavior::Empty => Ok(MonthlySeries::empty()),
            MockBehavior::Fail(err) => Err(err.clone()),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
        }
    }
}

#[async_trait]
impl CatalogProvider for MockConnector {
    async fn stock_catalog(&self) -> Result<Vec<CatalogEntry>, StagioneError> {
        if !self.configured {
            return Err(StagioneError::not_configured(self.name));
        }
        self.ensure_session().await;
        match &self.catalog {
            Some(entries) => Ok(entries.clone()),
            None => Err(StagioneError::upstream(self.name, "no catalog scripted")),
        }
    }
}

#[async_trait]
impl ListingDateProvider for MockConnector {
    async fn listing_date(&self, code: &str) -> Result<Option<NaiveDate>, StagioneError> {
        if !self.configured {
            return Err(StagioneError::not_configured(self.name));
        }
        self.ensure_session().await;
        Ok(self.listing_dates.get(code).copied())
    }
}

/// Builder for [`MockConnector`].
#[must_use]
pub struct MockConnectorBuilder {
    name: &'static str,
    configured: bool,
    delay: Option<Duration>,
    series_rules: HashMap<String, MockBehavior>,
    default_behavior: MockBehavior,
    catalog: Option<Vec<CatalogEntry>>,
    listing_dates: HashMap<String, NaiveDate>,
}

impl MockConnectorBuilder {
    /// Mark the connector as missing its configuration.
    pub fn unconfigured(mut self) -> Self {
        self.configured = false;
        self
    }

    /// Delay every series call by `delay` before responding.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Script the series behavior for a specific code.
    pub fn series_for(mut self, code: impl Into<String>, behavior: MockBehavior) -> Self {
        self.series_rules.insert(code.into(), behavior);
        self
    }

    /// Script the behavior for codes with no specific rule.
    pub fn default_behavior(mut self, behavior: MockBehavior) -> Self {
        self.default_behavior = behavior;
        self
    }

    /// Provide a stock catalog, enabling the catalog capability.
    pub fn catalog(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.catalog = Some(entries);
        self
    }

    /// Script a listing date for a code.
    pub fn listing_date(mut self, code: impl Into<String>, date: NaiveDate) -> Self {
        self.listing_dates.insert(code.into(), date);
        self
    }

    /// Finish building; the mock is shared so tests can keep a handle for
    /// counter assertions after registering it.
    #[must_use]
    pub fn build(self) -> Arc<MockConnector> {
        Arc::new(MockConnector {
            name: self.name,
            configured: self.configured,
            delay: self.delay,
            series_rules: self.series_rules,
            default_behavior: self.default_behavior,
            catalog: self.catalog,
            listing_dates: self.listing_dates,
            session_active: Mutex::new(false),
            logins: AtomicUsize::new(0),
            teardowns: AtomicUsize::new(0),
            series_calls: AtomicUsize::new(0),
            log: Mutex::new(CallLog::default()),
        })
    }
}
