//! stagione-tushare
//!
//! Connector that implements [`StagioneConnector`] on top of the Tushare
//! Pro HTTP API. Exposes monthly series, the exchange stock catalog, and
//! listing-date lookups. Requires an API token; an unconfigured connector
//! is skipped by the orchestrator.
#![warn(missing_docs)]

pub mod wire;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::debug;

use stagione_core::{
    CatalogEntry, CatalogProvider, DateSpan, ListingDateProvider, Market, MonthlySeries,
    SeriesProvider, StagioneConnector, StagioneError,
};

const DEFAULT_BASE_URL: &str = "https://api.tushare.pro";
const CONNECTOR_NAME: &str = "tushare";

const MONTHLY_FIELDS: &str = "ts_code,trade_date,open,high,low,close,vol,amount,pct_chg";
const STOCK_BASIC_FIELDS: &str = "ts_code,symbol,name,industry,list_date";

/// Tushare Pro connector.
///
/// The underlying `reqwest::Client` holds the connection pool and is the
/// session state; it is established lazily on first call and reused until
/// teardown.
pub struct TushareConnector {
    token: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl TushareConnector {
    /// Returns a builder; set the token before `build()` for a usable
    /// connector.
    #[must_use]
    pub fn builder() -> TushareConnectorBuilder {
        TushareConnectorBuilder {
            token: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    fn token(&self) -> Result<&str, StagioneError> {
        self.token
            .as_deref()
            .ok_or_else(|| StagioneError::not_configured(CONNECTOR_NAME))
    }

    /// Qualify a bare numeric code with its exchange suffix; codes that
    /// already carry a suffix pass through.
    fn qualify(code: &str) -> String {
        if code.contains('.') {
            code.to_owned()
        } else {
            format!("{code}.{}", Market::infer(code).suffix())
        }
    }

    async fn call(
        &self,
        api_name: &str,
        params: Value,
        fields: &str,
    ) -> Result<wire::Payload, StagioneError> {
        let body = json!({
            "api_name": api_name,
            "token": self.token()?,
            "params": params,
            "fields": fields,
        });
        debug!(api_name, "tushare call");
        let resp = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StagioneError::upstream(CONNECTOR_NAME, e.to_string()))?;
        if !resp.status().is_success() {
            return Err(StagioneError::upstream(
                CONNECTOR_NAME,
                format!("http status {}", resp.status()),
            ));
        }
        let envelope: wire::ApiResponse = resp
            .json()
            .await
            .map_err(|e| StagioneError::upstream(CONNECTOR_NAME, e.to_string()))?;
        wire::unwrap_envelope(CONNECTOR_NAME, envelope)
    }
}

#[async_trait]
impl StagioneConnector for TushareConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "Tushare Pro"
    }

    fn configured(&self) -> bool {
        self.token.is_some()
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self)
    }

    fn as_catalog_provider(&self) -> Option<&dyn CatalogProvider> {
        Some(self)
    }

    fn as_listing_date_provider(&self) -> Option<&dyn ListingDateProvider> {
        Some(self)
    }
}

#[async_trait]
impl SeriesProvider for TushareConnector {
    async fn monthly_series(
        &self,
        code: &str,
        span: DateSpan,
    ) -> Result<MonthlySeries, StagioneError> {
        let params = json!({
            "ts_code": Self::qualify(code),
            "start_date": span.start.format("%Y%m%d").to_string(),
            "end_date": span.end.format("%Y%m%d").to_string(),
        });
        let payload = self.call("monthly", params, MONTHLY_FIELDS).await?;
        Ok(MonthlySeries::build(wire::parse_monthly(&payload)))
    }
}

#[async_trait]
impl CatalogProvider for TushareConnector {
    async fn stock_catalog(&self) -> Result<Vec<CatalogEntry>, StagioneError> {
        let params = json!({ "list_status": "L" });
        let payload = self.call("stock_basic", params, STOCK_BASIC_FIELDS).await?;
        Ok(wire::parse_stock_basic(&payload))
    }
}

#[async_trait]
impl ListingDateProvider for TushareConnector {
    async fn listing_date(&self, code: &str) -> Result<Option<NaiveDate>, StagioneError> {
        let params = json!({ "ts_code": Self::qualify(code) });
        let payload = self
            .call("stock_basic", params, "ts_code,list_date")
            .await?;
        Ok(wire::parse_listing_date(&payload))
    }
}

/// Builder for [`TushareConnector`].
#[must_use]
pub struct TushareConnectorBuilder {
    token: Option<String>,
    base_url: String,
}

impl TushareConnectorBuilder {
    /// Set the Tushare Pro API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the API endpoint (useful against a local stub).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Finish building the connector.
    #[must_use]
    pub fn build(self) -> TushareConnector {
        TushareConnector {
            token: self.token,
            base_url: self.base_url,
            client: reqwest::Client::new(),
        }
    }
}
