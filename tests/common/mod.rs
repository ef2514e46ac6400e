#![allow(dead_code)]

use bandtrader::domain::backtest::BacktestConfig;
use bandtrader::domain::error::BandtraderError;
pub use bandtrader::domain::ohlcv::{Bar, Indicators, OhlcvBar};
use bandtrader::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal_macros::dec;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, BandtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BandtraderError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|b| start.is_none_or(|s| b.timestamp >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp <= e))
            .collect())
    }
}

/// Timestamp of the `i`-th M15 bar starting 2024-05-06 00:00.
pub fn ts(i: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(15 * i)
}

/// XAUUSD-like settings: SL 5.00, TP 10.00, 1 point = 10 account units.
pub fn gold_config() -> BacktestConfig {
    BacktestConfig {
        initial_balance: dec!(10000),
        lot_size: dec!(0.1),
        stop_loss_distance: 500.0,
        take_profit_distance: 1000.0,
        contract_multiplier: dec!(100),
        price_increment: 0.01,
    }
}

pub fn make_bar(i: i64, close: f64, indicators: Indicators) -> Bar {
    Bar {
        timestamp: ts(i),
        open: close,
        high: close,
        low: close,
        close,
        indicators,
    }
}

/// Bar that raises no signal: the fast EMA sits on the slow one.
pub fn neutral_bar(i: i64, close: f64) -> Bar {
    make_bar(
        i,
        close,
        Indicators {
            ema_fast: close,
            ema_slow: close,
            rsi: 50.0,
            band_lower: close - 20.0,
            band_upper: close + 20.0,
        },
    )
}

pub fn long_signal_bar(i: i64, close: f64) -> Bar {
    make_bar(
        i,
        close,
        Indicators {
            ema_fast: close - 10.0,
            ema_slow: close - 20.0,
            rsi: 60.0,
            band_lower: close + 1.0,
            band_upper: close + 40.0,
        },
    )
}

pub fn short_signal_bar(i: i64, close: f64) -> Bar {
    make_bar(
        i,
        close,
        Indicators {
            ema_fast: close + 10.0,
            ema_slow: close + 20.0,
            rsi: 40.0,
            band_lower: close - 40.0,
            band_upper: close - 1.0,
        },
    )
}

pub fn make_ohlcv(i: i64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: ts(i),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Oscillating close series around 2000, long enough to clear the
/// default 200-bar warm-up.
pub fn generate_ohlcv(count: usize) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            let close = 2000.0 + 0.05 * x + 12.0 * (x / 7.0).sin() + 4.0 * (x / 2.3).cos();
            make_ohlcv(i as i64, close)
        })
        .collect()
}

pub fn ohlcv_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("time,open,high,low,close,tick_volume,spread\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{},12\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
