use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::StagioneError;

/// Calendar month, validated to `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Month(u8);

impl Month {
    /// Build a month from its calendar number (1 = January).
    ///
    /// # Errors
    /// Returns `StagioneError::InvalidArg` when `m` is outside `1..=12`.
    pub fn new(m: u8) -> Result<Self, StagioneError> {
        if (1..=12).contains(&m) {
            Ok(Self(m))
        } else {
            Err(StagioneError::InvalidArg(format!(
                "month must be in 1..=12, got {m}"
            )))
        }
    }

    /// The calendar number of this month.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The month that follows, wrapping December to January.
    #[must_use]
    pub const fn succ(self) -> Self {
        if self.0 == 12 { Self(1) } else { Self(self.0 + 1) }
    }

    /// The first calendar day of this month in `year`, or `None` when the
    /// year is outside chrono's supported range.
    #[must_use]
    pub fn first_day(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, u32::from(self.0), 1)
    }

    /// Iterate over all twelve months in calendar order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=12).map(Self)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Month {
    type Error = StagioneError;

    fn try_from(m: u8) -> Result<Self, Self::Error> {
        Self::new(m)
    }
}

/// Ordered set of calendar months used to filter a series.
///
/// An empty set means "no filter requested"; callers that want all months
/// pass `None` rather than a full set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthSet(BTreeSet<Month>);

impl MonthSet {
    /// A set containing a single month.
    #[must_use]
    pub fn single(month: Month) -> Self {
        Self(BTreeSet::from([month]))
    }

    /// Build a set from raw calendar numbers.
    ///
    /// # Errors
    /// Returns `StagioneError::InvalidArg` when any number is outside `1..=12`.
    pub fn from_numbers<I: IntoIterator<Item = u8>>(nums: I) -> Result<Self, StagioneError> {
        nums.into_iter().map(Month::new).collect()
    }

    /// Whether `month` is in the set.
    #[must_use]
    pub fn contains(&self, month: Month) -> bool {
        self.0.contains(&month)
    }

    /// Number of months in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the months in calendar order.
    pub fn iter(&self) -> impl Iterator<Item = Month> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Month> for MonthSet {
    fn from_iter<I: IntoIterator<Item = Month>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Inclusive date range requested from providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    /// First day covered by the request.
    pub start: NaiveDate,
    /// Last day covered by the request.
    pub end: NaiveDate,
}

impl DateSpan {
    /// Build a span, validating that `start <= end`.
    ///
    /// # Errors
    /// Returns `StagioneError::InvalidArg` when the range is inverted.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, StagioneError> {
        if start > end {
            return Err(StagioneError::InvalidArg(format!(
                "date span start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }
}

/// One month of OHLCV data for a single entity.
///
/// All price fields are optional; providers differ in what they return.
/// `pct_change` is the month-over-month close change in percent, either
/// supplied by the provider or derived during series normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// Calendar year of the data point.
    pub year: i32,
    /// Calendar month of the data point.
    pub month: Month,
    /// Opening price for the month.
    pub open: Option<Decimal>,
    /// Highest price during the month.
    pub high: Option<Decimal>,
    /// Lowest price during the month.
    pub low: Option<Decimal>,
    /// Closing price for the month.
    pub close: Option<Decimal>,
    /// Traded volume during the month.
    pub volume: Option<Decimal>,
    /// Traded amount (turnover) during the month.
    pub amount: Option<Decimal>,
    /// Month-over-month close change in percent, rounded to 2 decimals.
    pub pct_change: Option<Decimal>,
}

impl MonthPoint {
    /// A point with the given coordinates and all data fields unset.
    #[must_use]
    pub fn bare(year: i32, month: Month) -> Self {
        Self {
            year,
            month,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            amount: None,
            pct_change: None,
        }
    }
}

/// Ordered monthly series for one entity.
///
/// Construction through [`MonthlySeries::build`] normalizes the input:
/// points are sorted by `(year, month)` ascending, duplicate coordinates
/// keep the last row seen, and missing `pct_change` values are filled from
/// adjacent closes. The first point of a series never gains a derived
/// `pct_change`, since there is no prior close to compare against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthlySeries {
    points: Vec<MonthPoint>,
}

impl MonthlySeries {
    /// Normalize `points` into a canonical series.
    #[must_use]
    pub fn build(points: Vec<MonthPoint>) -> Self {
        let mut by_coord: BTreeMap<(i32, Month), MonthPoint> = BTreeMap::new();
        for p in points {
            by_coord.insert((p.year, p.month), p);
        }
        let mut points: Vec<MonthPoint> = by_coord.into_values().collect();

        for i in 1..points.len() {
            if points[i].pct_change.is_some() {
                continue;
            }
            let (Some(prev), Some(cur)) = (points[i - 1].close, points[i].close) else {
                continue;
            };
            // A zero prior close would divide by zero; leave the gap.
            if prev.is_zero() {
                continue;
            }
            let pct = ((cur - prev) / prev * Decimal::ONE_HUNDRED).round_dp(2);
            points[i].pct_change = Some(pct);
        }

        Self { points }
    }

    /// A series with no points.
    #[must_use]
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The normalized points, ordered by `(year, month)` ascending.
    #[must_use]
    pub fn points(&self) -> &[MonthPoint] {
        &self.points
    }

    /// The most recent point, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&MonthPoint> {
        self.points.last()
    }
}

impl IntoIterator for MonthlySeries {
    type Item = MonthPoint;
    type IntoIter = std::vec::IntoIter<MonthPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}
