//! Technical indicators computed over a close series.
//!
//! Each function returns one entry per input close; `None` marks the
//! warm-up where the indicator is not yet defined.

pub mod bollinger;
pub mod ema;
pub mod rsi;

use std::fmt;

/// Indicator settings used to enrich bars before a backtest.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_stddev: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ema_fast: 50,
            ema_slow: 200,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_stddev: 2.0,
        }
    }
}

impl IndicatorParams {
    /// Number of leading bars before every indicator is defined.
    pub fn warmup_bars(&self) -> usize {
        // EMA and Bollinger first appear at index period-1, RSI at index period
        self.ema_fast
            .max(self.ema_slow)
            .max(self.bollinger_period)
            .max(self.rsi_period + 1)
    }
}

impl fmt::Display for IndicatorParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "EMA({}), EMA({}), RSI({}), BOLLINGER({},{})",
            self.ema_fast, self.ema_slow, self.rsi_period, self.bollinger_period, self.bollinger_stddev
        )
    }
}
