//! stagione-finnhub
//!
//! Connector that implements [`StagioneConnector`] on top of the Finnhub
//! candle API with monthly resolution. Finnhub does not supply percent
//! changes, so they are derived during series normalization. Requires an
//! API key; an unconfigured connector is skipped by the orchestrator.
#![warn(missing_docs)]

pub mod wire;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::debug;

use stagione_core::{
    DateSpan, MonthlySeries, SeriesProvider, StagioneConnector, StagioneError,
};

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";
const CONNECTOR_NAME: &str = "finnhub";

/// Finnhub connector.
pub struct FinnhubConnector {
    api_key: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl FinnhubConnector {
    /// Returns a builder; set the API key before `build()` for a usable
    /// connector.
    #[must_use]
    pub fn builder() -> FinnhubConnectorBuilder {
        FinnhubConnectorBuilder {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }

    fn api_key(&self) -> Result<&str, StagioneError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| StagioneError::not_configured(CONNECTOR_NAME))
    }
}

#[async_trait]
impl StagioneConnector for FinnhubConnector {
    fn name(&self) -> &'static str {
        CONNECTOR_NAME
    }

    fn vendor(&self) -> &'static str {
        "Finnhub"
    }

    fn configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn as_series_provider(&self) -> Option<&dyn SeriesProvider> {
        Some(self)
    }
}

#[async_trait]
impl SeriesProvider for FinnhubConnector {
    async fn monthly_series(
        &self,
        code: &str,
        span: DateSpan,
    ) -> Result<MonthlySeries, StagioneError> {
        let from = span
            .start
            .and_hms_opt(0, 0, 0)
            .map_or(0, |dt: NaiveDateTime| dt.and_utc().timestamp());
        let to = span
            .end
            .and_hms_opt(23, 59, 59)
            .map_or(0, |dt: NaiveDateTime| dt.and_utc().timestamp());

        debug!(code, from, to, "finnhub candle call");
        let resp = self
            .client
            .get(format!("{}/stock/candle", self.base_url))
            .query(&[
                ("symbol", code),
                ("resolution", "M"),
                ("from", &from.to_string()),
                ("to", &to.to_string()),
                ("token", self.api_key()?),
            ])
            .send()
            .await
            .map_err(|e| StagioneError::upstream(CONNECTOR_NAME, e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StagioneError::auth_failed(
                CONNECTOR_NAME,
                format!("http status {status}"),
            ));
        }
        if !status.is_success() {
            return Err(StagioneError::upstream(
                CONNECTOR_NAME,
                format!("http status {status}"),
            ));
        }

        let candles: wire::CandleResponse = resp
            .json()
            .await
            .map_err(|e| StagioneError::upstream(CONNECTOR_NAME, e.to_string()))?;
        let points = wire::parse_candles(CONNECTOR_NAME, &candles)?;
        Ok(MonthlySeries::build(points))
    }
}

/// Builder for [`FinnhubConnector`].
#[must_use]
pub struct FinnhubConnectorBuilder {
    api_key: Option<String>,
    base_url: String,
}

impl FinnhubConnectorBuilder {
    /// Set the Finnhub API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the API endpoint (useful against a local stub).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Finish building the connector.
    #[must_use]
    pub fn build(self) -> FinnhubConnector {
        FinnhubConnector {
            api_key: self.api_key,
            base_url: self.base_url,
            client: reqwest::Client::new(),
        }
    }
}
