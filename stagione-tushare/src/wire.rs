//! Wire-format types and pure parsing for the Tushare Pro JSON API.
//!
//! Tushare answers every call with a `{code, msg, data}` envelope where
//! `data` is columnar: a `fields` name list plus `items` rows of loosely
//! typed values. Parsing here is pure so it can be tested without a
//! network.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use stagione_core::{CatalogEntry, Market, Month, MonthPoint, StagioneError};

/// Top-level response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    /// Zero on success; non-zero codes carry a message in `msg`.
    pub code: i64,
    /// Error message accompanying a non-zero code.
    #[serde(default)]
    pub msg: Option<String>,
    /// Columnar payload, present on success.
    #[serde(default)]
    pub data: Option<Payload>,
}

/// Columnar payload: one name per column, one value list per row.
#[derive(Debug, Deserialize)]
pub struct Payload {
    /// Column names, in item order.
    pub fields: Vec<String>,
    /// Rows of loosely typed values.
    pub items: Vec<Vec<Value>>,
}

// Codes Tushare uses for credential problems.
const AUTH_CODES: &[i64] = &[2002, 40001];

/// Unwrap the envelope, mapping non-zero codes to errors.
///
/// # Errors
/// `AuthFailed` for credential-related codes, `Upstream` otherwise or when
/// a success envelope carries no payload.
pub fn unwrap_envelope(provider: &str, resp: ApiResponse) -> Result<Payload, StagioneError> {
    if resp.code != 0 {
        let msg = resp.msg.unwrap_or_else(|| format!("code {}", resp.code));
        if AUTH_CODES.contains(&resp.code) || msg.to_lowercase().contains("token") {
            return Err(StagioneError::auth_failed(provider, msg));
        }
        return Err(StagioneError::upstream(provider, msg));
    }
    resp.data
        .ok_or_else(|| StagioneError::upstream(provider, "success envelope without data"))
}

struct Columns<'a> {
    index: HashMap<&'a str, usize>,
}

impl<'a> Columns<'a> {
    fn new(fields: &'a [String]) -> Self {
        let index = fields
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        Self { index }
    }

    fn str_of(&self, row: &'a [Value], name: &str) -> Option<&'a str> {
        row.get(*self.index.get(name)?)?.as_str()
    }

    fn dec_of(&self, row: &[Value], name: &str) -> Option<Decimal> {
        decimal_value(row.get(*self.index.get(name)?)?)
    }
}

fn decimal_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

fn yyyymmdd(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

/// Parse rows of the `monthly` API into month points.
///
/// Rows with an unparseable `trade_date` are dropped; the provider's own
/// `pct_chg` is passed through untouched.
#[must_use]
pub fn parse_monthly(payload: &Payload) -> Vec<MonthPoint> {
    let cols = Columns::new(&payload.fields);
    payload
        .items
        .iter()
        .filter_map(|row| {
            let date = yyyymmdd(cols.str_of(row, "trade_date")?)?;
            let month = Month::new(u8::try_from(date.month()).ok()?).ok()?;
            Some(MonthPoint {
                open: cols.dec_of(row, "open"),
                high: cols.dec_of(row, "high"),
                low: cols.dec_of(row, "low"),
                close: cols.dec_of(row, "close"),
                volume: cols.dec_of(row, "vol"),
                amount: cols.dec_of(row, "amount"),
                pct_change: cols.dec_of(row, "pct_chg"),
                ..MonthPoint::bare(date.year(), month)
            })
        })
        .collect()
}

/// Parse rows of the `stock_basic` API into catalog entries.
///
/// Rows without a usable bare code are dropped. The market is inferred
/// from the code shape; missing listing dates and industries stay `None`.
#[must_use]
pub fn parse_stock_basic(payload: &Payload) -> Vec<CatalogEntry> {
    let cols = Columns::new(&payload.fields);
    payload
        .items
        .iter()
        .filter_map(|row| {
            let code = cols
                .str_of(row, "symbol")
                .or_else(|| cols.str_of(row, "ts_code").and_then(|c| c.split('.').next()))?
                .to_owned();
            let name = cols.str_of(row, "name").unwrap_or_default().to_owned();
            Some(CatalogEntry {
                market: Market::infer(&code),
                listing_date: cols.str_of(row, "list_date").and_then(yyyymmdd),
                industry_name: cols
                    .str_of(row, "industry")
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned),
                code,
                name,
            })
        })
        .collect()
}

/// Parse a `stock_basic` single-stock lookup into a listing date.
#[must_use]
pub fn parse_listing_date(payload: &Payload) -> Option<NaiveDate> {
    let cols = Columns::new(&payload.fields);
    payload
        .items
        .first()
        .and_then(|row| cols.str_of(row, "list_date"))
        .and_then(yyyymmdd)
}
