//! The seasonality engine: pure statistics over normalized monthly series.
//!
//! Everything here is deterministic and I/O-free. Percentages are exact
//! [`Decimal`] values rounded to two decimals, so summarizing the same
//! series twice yields byte-identical results under serde.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::Industry;
use crate::series::{Month, MonthPoint, MonthSet, MonthlySeries};

/// Aggregated up/down statistics for a set of month points.
///
/// Only points with a non-`None`, non-zero `pct_change` contribute; zero
/// changes and gaps are excluded from every count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonalityStats {
    /// Number of contributing months that closed up.
    pub up_count: u32,
    /// Number of contributing months that closed down.
    pub down_count: u32,
    /// `up_count + down_count`.
    pub total_count: u32,
    /// `up_count / total_count` in percent, rounded to 2 decimals.
    pub up_probability: Decimal,
    /// `down_count / total_count` in percent, rounded to 2 decimals.
    pub down_probability: Decimal,
    /// Mean percent change of up months, rounded to 2 decimals; zero when
    /// there are no up months.
    pub avg_up_pct: Decimal,
    /// Mean percent change of down months, rounded to 2 decimals; zero when
    /// there are no down months.
    pub avg_down_pct: Decimal,
    /// Number of distinct calendar years among contributing months.
    pub years_count: u32,
    /// Earliest and latest calendar year among contributing months.
    pub year_range: (i32, i32),
}

/// Result of summarizing one entity's series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeasonalityReport {
    /// A single combined summary over the requested months.
    Summary {
        /// Combined statistics.
        stats: SeasonalityStats,
    },
    /// A combined summary plus one entry per requested month.
    PerMonth {
        /// Combined statistics over all requested months.
        stats: SeasonalityStats,
        /// Per-month statistics, keyed by month; months with no
        /// contributing points are omitted.
        by_month: BTreeMap<Month, SeasonalityStats>,
    },
}

impl SeasonalityReport {
    /// The combined statistics, regardless of report shape.
    #[must_use]
    pub const fn stats(&self) -> &SeasonalityStats {
        match self {
            Self::Summary { stats } | Self::PerMonth { stats, .. } => stats,
        }
    }
}

/// One row of an industry ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndustryRanking {
    /// The ranked industry.
    pub industry: Industry,
    /// Number of member stocks in the store.
    pub stock_count: u64,
    /// Seasonality statistics of the industry's index.
    pub stats: SeasonalityStats,
}

/// Summarize a series for the requested months.
///
/// `filter` restricts which calendar months contribute; `None` means all
/// twelve. Returns `None` when no point contributes or when the combined
/// contributing count falls below `min_total_count`. The floor applies to
/// the combined count even when a per-month breakdown is requested, so a
/// report never exists whose summary would have been suppressed.
///
/// A breakdown is produced only when `per_month` is set and more than one
/// month is in scope; for a single-month filter the breakdown would repeat
/// the summary.
#[must_use]
pub fn summarize(
    series: &MonthlySeries,
    filter: Option<&MonthSet>,
    min_total_count: u32,
    per_month: bool,
) -> Option<SeasonalityReport> {
    let in_scope = |p: &&MonthPoint| filter.is_none_or(|f| f.contains(p.month));
    let stats = accumulate(series.points().iter().filter(in_scope))?;
    if stats.total_count < min_total_count {
        return None;
    }

    let months_in_scope = filter.map_or(12, MonthSet::len);
    if !(per_month && months_in_scope > 1) {
        return Some(SeasonalityReport::Summary { stats });
    }

    let mut by_month = BTreeMap::new();
    let months: Vec<Month> = match filter {
        Some(f) => f.iter().collect(),
        None => Month::all().collect(),
    };
    for m in months {
        let month_stats = accumulate(series.points().iter().filter(|p| p.month == m));
        if let Some(s) = month_stats {
            by_month.insert(m, s);
        }
    }
    Some(SeasonalityReport::PerMonth { stats, by_month })
}

fn accumulate<'a>(points: impl Iterator<Item = &'a MonthPoint>) -> Option<SeasonalityStats> {
    let mut up_count = 0u32;
    let mut down_count = 0u32;
    let mut up_sum = Decimal::ZERO;
    let mut down_sum = Decimal::ZERO;
    let mut years: BTreeSet<i32> = BTreeSet::new();

    for p in points {
        let Some(pct) = p.pct_change else { continue };
        if pct > Decimal::ZERO {
            up_count += 1;
            up_sum += pct;
            years.insert(p.year);
        } else if pct < Decimal::ZERO {
            down_count += 1;
            down_sum += pct;
            years.insert(p.year);
        }
        // Exactly-zero changes are neither up nor down.
    }

    let total_count = up_count + down_count;
    if total_count == 0 {
        return None;
    }

    let total = Decimal::from(total_count);
    let pct_of_total =
        |count: u32| (Decimal::from(count) / total * Decimal::ONE_HUNDRED).round_dp(2);
    let mean = |sum: Decimal, count: u32| {
        if count == 0 {
            Decimal::ZERO
        } else {
            (sum / Decimal::from(count)).round_dp(2)
        }
    };

    let (first_year, last_year) = match (years.first(), years.last()) {
        (Some(&first), Some(&last)) => (first, last),
        // total_count > 0 guarantees at least one contributing year.
        _ => return None,
    };

    Some(SeasonalityStats {
        up_count,
        down_count,
        total_count,
        up_probability: pct_of_total(up_count),
        down_probability: pct_of_total(down_count),
        avg_up_pct: mean(up_sum, up_count),
        avg_down_pct: mean(down_sum, down_count),
        years_count: u32::try_from(years.len()).unwrap_or(u32::MAX),
        year_range: (first_year, last_year),
    })
}
