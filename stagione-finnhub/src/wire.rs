//! Wire-format types and pure parsing for the Finnhub candle API.
//!
//! Finnhub returns parallel arrays keyed by single letters, one element
//! per candle, plus a status string. `s == "no_data"` is a valid empty
//! answer, not an error.

use chrono::{DateTime, Datelike};
use rust_decimal::Decimal;
use serde::Deserialize;

use stagione_core::{Month, MonthPoint, StagioneError};

/// Response of `GET /stock/candle`.
#[derive(Debug, Deserialize)]
pub struct CandleResponse {
    /// Status: `"ok"` or `"no_data"`.
    pub s: String,
    /// Unix timestamps, one per candle.
    #[serde(default)]
    pub t: Vec<i64>,
    /// Open prices.
    #[serde(default)]
    pub o: Vec<Option<Decimal>>,
    /// High prices.
    #[serde(default)]
    pub h: Vec<Option<Decimal>>,
    /// Low prices.
    #[serde(default)]
    pub l: Vec<Option<Decimal>>,
    /// Close prices.
    #[serde(default)]
    pub c: Vec<Option<Decimal>>,
    /// Volumes.
    #[serde(default)]
    pub v: Vec<Option<Decimal>>,
}

/// Turn a candle response into month points.
///
/// `no_data` yields an empty vector. The parallel arrays must all be at
/// least as long as `t`; a shorter value array is a malformed payload.
/// Percent changes are not supplied by Finnhub and are left unset, to be
/// derived during series normalization.
///
/// # Errors
/// `Upstream` for an unknown status or mismatched array lengths.
pub fn parse_candles(provider: &str, resp: &CandleResponse) -> Result<Vec<MonthPoint>, StagioneError> {
    match resp.s.as_str() {
        "no_data" => return Ok(Vec::new()),
        "ok" => {}
        other => {
            return Err(StagioneError::upstream(
                provider,
                format!("unexpected candle status {other:?}"),
            ));
        }
    }

    let n = resp.t.len();
    for (name, len) in [
        ("o", resp.o.len()),
        ("h", resp.h.len()),
        ("l", resp.l.len()),
        ("c", resp.c.len()),
        ("v", resp.v.len()),
    ] {
        if len < n {
            return Err(StagioneError::upstream(
                provider,
                format!("candle array {name:?} shorter than timestamps ({len} < {n})"),
            ));
        }
    }

    let mut points = Vec::with_capacity(n);
    for i in 0..n {
        let Some(ts) = DateTime::from_timestamp(resp.t[i], 0) else {
            continue;
        };
        let date = ts.date_naive();
        let Ok(month) = u8::try_from(date.month()).map(Month::new) else {
            continue;
        };
        let Ok(month) = month else { continue };
        points.push(MonthPoint {
            open: resp.o[i],
            high: resp.h[i],
            low: resp.l[i],
            close: resp.c[i],
            volume: resp.v[i],
            ..MonthPoint::bare(date.year(), month)
        });
    }
    Ok(points)
}
