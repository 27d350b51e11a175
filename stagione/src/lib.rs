//! Stagione computes monthly seasonality statistics across multiple
//! market data providers.
//!
//! Overview
//! - Routes series acquisition through connectors that implement the
//!   `stagione_core` contracts, in configured priority order with
//!   per-provider timeouts and sequential failover.
//! - Computes up/down-month seasonality reports for single stocks and
//!   industries, with month filtering, a minimum-sample floor, and
//!   per-month breakdowns.
//! - Runs bulk jobs (industry ranking, data refresh) on their own tasks,
//!   streaming progress events over a single-consumer channel that always
//!   ends with exactly one terminal event.
//! - Treats storage as an interface boundary (`Store`/`StoreHandle`) with
//!   an in-memory implementation included; bulk jobs recycle their store
//!   handle every N operations through a lease.
//!
//! Key behaviors and trade-offs
//! - Failover: a provider error, timeout, or empty answer moves on to the
//!   next source; series acquisition itself never fails, resolving to an
//!   empty series when every source is exhausted.
//! - Bounded execution: provider calls and per-entity bulk steps run under
//!   one primitive that abandons stalled workers at a ceiling rather than
//!   force-killing them; an abandoned worker's result is discarded.
//! - Progress: events are emitted in entity order before each entity is
//!   processed; dropping the receiver orphans a job without stopping its
//!   store writes or session teardown.
//!
//! Building an orchestrator and querying one stock:
//! ```rust,ignore
//! use std::sync::Arc;
//! use stagione::{MemoryStore, Stagione};
//!
//! let tushare = Arc::new(
//!     stagione_tushare::TushareConnector::builder().token("...").build(),
//! );
//! let store = Arc::new(MemoryStore::new());
//!
//! let stagione = Arc::new(
//!     Stagione::builder()
//!         .with_connector(tushare)
//!         .with_store(store)
//!         .build()?,
//! );
//!
//! let report = stagione.stock_seasonality("600000", None, 5, true).await?;
//! ```
//!
//! Running a bulk ranking and consuming its progress stream:
//! ```rust,ignore
//! use stagione::{JobEvent, Month};
//!
//! let mut rx = stagione.clone().start_bulk_ranking(Month::new(2)?, 5, 10)?;
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         JobEvent::Progress(p) => eprintln!("{}% {}", p.percent, p.message),
//!         JobEvent::Finished(outcome) => println!("{} ranked", outcome.rankings.len()),
//!         JobEvent::Failed { message } => eprintln!("failed: {message}"),
//!     }
//! }
//! ```
#![warn(missing_docs)]

/// The bounded-execution primitive shared by provider calls and bulk
/// entity steps.
pub mod bounded;
mod bulk;
mod core;
mod fetch;
/// The single-consumer progress channel for bulk jobs.
pub mod progress;
mod query;
/// The storage boundary and the in-memory store.
pub mod store;

pub use crate::core::{Stagione, StagioneBuilder};
pub use crate::progress::{ProgressReceiver, ProgressSender};
pub use crate::query::{IndustrySeasonality, StockSeasonality};
pub use crate::store::{MemoryStore, StockFilter, Store, StoreHandle, StoreLease};

pub use stagione_core::{
    CatalogEntry, DateSpan, Industry, IndustryRanking, JobEvent, Market, Month, MonthPoint,
    MonthSet, MonthlySeries, Progress, ProviderConfig, RankOutcome, RefreshOutcome,
    SeasonalityReport, SeasonalityStats, SourceConfig, StagioneConnector, StagioneError, Stock,
    summarize,
};
