//! stagione-core
//!
//! Core types, connector traits, and the seasonality engine shared across
//! the stagione ecosystem.
//!
//! - `series`: validated month/series types and normalization.
//! - `seasonality`: pure up/down statistics over normalized series.
//! - `connector`: the `StagioneConnector` trait and capability role traits.
//! - `entity`, `config`, `progress`, `error`: shared data and envelopes.
//!
//! The connector traits assume the Tokio ecosystem as the async runtime;
//! the rest of the crate is runtime-agnostic and I/O-free.
#![warn(missing_docs)]

/// Configuration types consumed by the orchestrator.
pub mod config;
/// The `StagioneConnector` trait and capability role traits.
pub mod connector;
/// Stock, industry, and catalog entities.
pub mod entity;
mod error;
/// Progress and job-event envelopes.
pub mod progress;
/// The seasonality statistics engine.
pub mod seasonality;
/// Month, span, and monthly-series types.
pub mod series;

pub use config::{ProviderConfig, SourceConfig};
pub use connector::{CatalogProvider, ListingDateProvider, SeriesProvider, StagioneConnector};
pub use entity::{CatalogEntry, Industry, Market, Stock};
pub use error::StagioneError;
pub use progress::{JobEvent, Progress, RankOutcome, RefreshOutcome};
pub use seasonality::{IndustryRanking, SeasonalityReport, SeasonalityStats, summarize};
pub use series::{DateSpan, Month, MonthPoint, MonthSet, MonthlySeries};
