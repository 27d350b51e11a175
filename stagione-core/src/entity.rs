use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exchange a listed entity trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Shanghai Stock Exchange.
    Sh,
    /// Shenzhen Stock Exchange.
    Sz,
}

impl Market {
    /// Infer the market from a bare numeric stock code. Codes starting with
    /// `6` trade in Shanghai, everything else in Shenzhen.
    #[must_use]
    pub fn infer(code: &str) -> Self {
        if code.starts_with('6') { Self::Sh } else { Self::Sz }
    }

    /// The short exchange suffix used in qualified symbols (`SH`, `SZ`).
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Sh => "SH",
            Self::Sz => "SZ",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// A listed stock as known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    /// Bare numeric code, e.g. `600000`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Exchange the stock trades on.
    pub market: Market,
    /// First trading day, when known.
    pub listing_date: Option<NaiveDate>,
    /// Code of the industry the stock belongs to, when classified.
    pub industry_code: Option<String>,
    /// Name of the industry the stock belongs to, when classified.
    pub industry_name: Option<String>,
    /// Whether the stock has been delisted.
    pub delisted: bool,
}

/// An industry classification entry as known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    /// Classification code, e.g. `801080`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification depth (1 = sector, deeper levels are finer).
    pub level: u8,
    /// Parent classification code, absent for top-level entries.
    pub parent_code: Option<String>,
    /// Code of the tradable index tracking this industry, when one exists.
    /// Industries without an index cannot be measured.
    pub index_code: Option<String>,
}

/// One row of a provider's exchange catalog listing.
///
/// Catalog entries are merged into [`Stock`] records by the store; fields a
/// provider does not supply stay `None` and never overwrite stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Bare numeric code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Exchange the stock trades on.
    pub market: Market,
    /// First trading day, when the provider supplies it.
    pub listing_date: Option<NaiveDate>,
    /// Industry name, when the provider supplies it.
    pub industry_name: Option<String>,
}
