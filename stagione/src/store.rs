//! Storage boundary: the `Store`/`StoreHandle` traits, an in-memory
//! implementation, and the handle lease used by bulk jobs.
//!
//! A [`Store`] hands out short-lived [`StoreHandle`]s (think: pooled
//! connections or sessions). Single-entity queries acquire one handle per
//! call; bulk jobs go through a [`StoreLease`] that recycles the handle
//! every N operations so one long job never pins a session for its whole
//! runtime.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use stagione_core::{Industry, Market, Month, MonthPoint, MonthlySeries, StagioneError, Stock};

/// Filter for store stock listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockFilter {
    /// Restrict to one exchange.
    pub market: Option<Market>,
    /// Restrict to members of one industry.
    pub industry_code: Option<String>,
    /// Include delisted stocks; excluded by default.
    pub include_delisted: bool,
}

/// A live store session. Dropped to release it.
#[async_trait]
pub trait StoreHandle: Send + Sync {
    /// All known industries, ordered by code.
    async fn industries(&self) -> Result<Vec<Industry>, StagioneError>;

    /// One industry by code.
    async fn industry(&self, code: &str) -> Result<Option<Industry>, StagioneError>;

    /// Insert an industry or backfill missing fields of an existing one.
    /// Returns `true` when the industry was new. Existing non-empty fields
    /// are never overwritten.
    async fn upsert_industry(&self, industry: Industry) -> Result<bool, StagioneError>;

    /// Stocks matching `filter`, ordered by code.
    async fn stocks(&self, filter: &StockFilter) -> Result<Vec<Stock>, StagioneError>;

    /// One stock by code.
    async fn stock(&self, code: &str) -> Result<Option<Stock>, StagioneError>;

    /// Insert a stock or backfill missing fields of an existing one.
    /// Returns `true` when the stock was new. Existing non-empty fields are
    /// never overwritten.
    async fn upsert_stock(&self, stock: Stock) -> Result<bool, StagioneError>;

    /// Number of stocks classified under an industry code.
    async fn stock_count_for_industry(&self, industry_code: &str) -> Result<u64, StagioneError>;

    /// The stored monthly series for a code; empty when none.
    async fn series(&self, code: &str) -> Result<MonthlySeries, StagioneError>;

    /// Write month points for a code, overwriting matching `(year, month)`
    /// coordinates. Returns how many points were new.
    async fn upsert_points(&self, code: &str, points: &[MonthPoint])
    -> Result<usize, StagioneError>;

    /// The newest stored `(year, month)` coordinate for a code.
    async fn latest_point(&self, code: &str) -> Result<Option<(i32, Month)>, StagioneError>;

    /// Stocks whose code or name contains `keyword` (case-insensitive),
    /// ordered by code, truncated to `limit`.
    async fn suggest(&self, keyword: &str, limit: usize) -> Result<Vec<Stock>, StagioneError>;
}

impl std::fmt::Debug for dyn StoreHandle + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn StoreHandle")
    }
}

/// Factory for store sessions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Acquire a fresh handle.
    async fn acquire(&self) -> Result<Box<dyn StoreHandle>, StagioneError>;
}

/// Re-acquires a store handle every `max_ops` operations.
///
/// Bulk jobs perform thousands of store operations; holding one session
/// that long risks upstream idle timeouts. The lease releases the current
/// handle before acquiring its replacement, so at most one is live.
pub struct StoreLease {
    store: Arc<dyn Store>,
    handle: Option<Box<dyn StoreHandle>>,
    ops: usize,
    max_ops: usize,
}

impl StoreLease {
    /// A lease over `store`, recycling after `max_ops` operations. A zero
    /// `max_ops` recycles on every operation.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, max_ops: usize) -> Self {
        Self {
            store,
            handle: None,
            ops: 0,
            max_ops,
        }
    }

    /// The current handle, recycled when due. Each call counts as one
    /// operation.
    ///
    /// # Errors
    /// Propagates the store's acquisition failure; the lease holds no
    /// handle afterwards and the next call retries.
    pub async fn handle(&mut self) -> Result<&dyn StoreHandle, StagioneError> {
        if self.ops >= self.max_ops {
            self.handle = None;
        }
        if self.handle.is_none() {
            let fresh = self.store.acquire().await?;
            self.handle = Some(fresh);
            self.ops = 0;
        }
        self.ops += 1;
        self.handle
            .as_deref()
            .ok_or_else(|| StagioneError::store("lease holds no handle after acquisition"))
    }
}

#[derive(Default)]
struct MemoryInner {
    industries: BTreeMap<String, Industry>,
    stocks: BTreeMap<String, Stock>,
    points: BTreeMap<String, BTreeMap<(i32, Month), MonthPoint>>,
}

/// Thread-safe in-memory store, for tests and single-instance use.
///
/// Handles share the same underlying maps; `acquire_count` exposes how
/// many sessions were handed out, which lease tests assert on.
#[derive(Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
    acquires: AtomicUsize,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles acquired so far.
    #[must_use]
    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    /// Seed an industry.
    pub async fn insert_industry(&self, industry: Industry) {
        self.inner
            .write()
            .await
            .industries
            .insert(industry.code.clone(), industry);
    }

    /// Seed a stock.
    pub async fn insert_stock(&self, stock: Stock) {
        self.inner
            .write()
            .await
            .stocks
            .insert(stock.code.clone(), stock);
    }

    /// Seed month points for a code.
    pub async fn insert_points(&self, code: &str, points: Vec<MonthPoint>) {
        let mut inner = self.inner.write().await;
        let series = inner.points.entry(code.to_owned()).or_default();
        for p in points {
            series.insert((p.year, p.month), p);
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreHandle>, StagioneError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryHandle {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryHandle {
    inner: Arc<RwLock<MemoryInner>>,
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn industries(&self) -> Result<Vec<Industry>, StagioneError> {
        Ok(self.inner.read().await.industries.values().cloned().collect())
    }

    async fn industry(&self, code: &str) -> Result<Option<Industry>, StagioneError> {
        Ok(self.inner.read().await.industries.get(code).cloned())
    }

    async fn upsert_industry(&self, industry: Industry) -> Result<bool, StagioneError> {
        let mut inner = self.inner.write().await;
        match inner.industries.get_mut(&industry.code) {
            None => {
                inner.industries.insert(industry.code.clone(), industry);
                Ok(true)
            }
            Some(existing) => {
                if existing.parent_code.is_none() {
                    existing.parent_code = industry.parent_code;
                }
                if existing.index_code.is_none() {
                    existing.index_code = industry.index_code;
                }
                Ok(false)
            }
        }
    }

    async fn stocks(&self, filter: &StockFilter) -> Result<Vec<Stock>, StagioneError> {
        let inner = self.inner.read().await;
        Ok(inner
            .stocks
            .values()
            .filter(|s| filter.include_delisted || !s.delisted)
            .filter(|s| filter.market.is_none_or(|m| s.market == m))
            .filter(|s| {
                filter
                    .industry_code
                    .as_deref()
                    .is_none_or(|code| s.industry_code.as_deref() == Some(code))
            })
            .cloned()
            .collect())
    }

    async fn stock(&self, code: &str) -> Result<Option<Stock>, StagioneError> {
        Ok(self.inner.read().await.stocks.get(code).cloned())
    }

    async fn upsert_stock(&self, stock: Stock) -> Result<bool, StagioneError> {
        let mut inner = self.inner.write().await;
        match inner.stocks.get_mut(&stock.code) {
            None => {
                inner.stocks.insert(stock.code.clone(), stock);
                Ok(true)
            }
            Some(existing) => {
                if existing.listing_date.is_none() {
                    existing.listing_date = stock.listing_date;
                }
                if existing.industry_code.is_none() {
                    existing.industry_code = stock.industry_code;
                }
                if existing.industry_name.is_none() {
                    existing.industry_name = stock.industry_name;
                }
                Ok(false)
            }
        }
    }

    async fn stock_count_for_industry(&self, industry_code: &str) -> Result<u64, StagioneError> {
        let inner = self.inner.read().await;
        let count = inner
            .stocks
            .values()
            .filter(|s| s.industry_code.as_deref() == Some(industry_code))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn series(&self, code: &str) -> Result<MonthlySeries, StagioneError> {
        let inner = self.inner.read().await;
        let points = inner
            .points
            .get(code)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        Ok(MonthlySeries::build(points))
    }

    async fn upsert_points(
        &self,
        code: &str,
        points: &[MonthPoint],
    ) -> Result<usize, StagioneError> {
        let mut inner = self.inner.write().await;
        let series = inner.points.entry(code.to_owned()).or_default();
        let mut added = 0;
        for p in points {
            if series.insert((p.year, p.month), p.clone()).is_none() {
                added += 1;
            }
        }
        Ok(added)
    }

    async fn latest_point(&self, code: &str) -> Result<Option<(i32, Month)>, StagioneError> {
        let inner = self.inner.read().await;
        Ok(inner
            .points
            .get(code)
            .and_then(|m| m.keys().next_back().copied()))
    }

    async fn suggest(&self, keyword: &str, limit: usize) -> Result<Vec<Stock>, StagioneError> {
        let needle = keyword.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .stocks
            .values()
            .filter(|s| {
                s.code.to_lowercase().contains(&needle) || s.name.to_lowercase().contains(&needle)
            })
            .take(limit)
            .cloned()
            .collect())
    }
}
