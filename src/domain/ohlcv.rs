//! Raw and indicator-enriched bar representations.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// One OHLCV record as delivered by a bar source, before any indicator is
/// attached.
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Indicator values the signal rules read. Populated once by the
/// enrichment step; a non-finite value means "not defined".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub band_lower: f64,
    pub band_upper: f64,
}

impl Indicators {
    /// Name of the first undefined indicator, if any.
    pub fn first_undefined(&self) -> Option<&'static str> {
        [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("rsi", self.rsi),
            ("band_lower", self.band_lower),
            ("band_upper", self.band_upper),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// A bar as consumed by the backtest engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub indicators: Indicators,
}

impl Bar {
    pub fn from_ohlcv(raw: &OhlcvBar, indicators: Indicators) -> Self {
        Bar {
            timestamp: raw.timestamp,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            indicators,
        }
    }

    /// Name of the first OHLC field that is not a positive finite number
    /// inside the decimal range used for money.
    pub fn first_invalid_price(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
        .into_iter()
        .find(|(_, v)| !(v.is_finite() && *v > 0.0 && Decimal::from_f64(*v).is_some()))
        .map(|(name, _)| name)
    }
}

/// Unix seconds, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM` or a bare date (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
