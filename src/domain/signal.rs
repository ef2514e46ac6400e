//! Entry signal evaluation.
//!
//! Trend filter (close and fast EMA on the same side of the slow EMA) plus
//! momentum (RSI across the midline) plus a Bollinger band touch:
//!
//! - long:  close > EMA_slow, EMA_fast > EMA_slow, RSI > 50, close <= lower band
//! - short: close < EMA_slow, EMA_fast < EMA_slow, RSI < 50, close >= upper band

use super::ohlcv::Bar;

/// RSI midline separating bullish from bearish momentum.
pub const RSI_MIDLINE: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    NoSignal,
    EnterLong,
    EnterShort,
}

pub fn evaluate(bar: &Bar) -> Signal {
    if is_long_entry(bar) {
        Signal::EnterLong
    } else if is_short_entry(bar) {
        Signal::EnterShort
    } else {
        Signal::NoSignal
    }
}

fn is_long_entry(bar: &Bar) -> bool {
    let ind = &bar.indicators;
    bar.close > ind.ema_slow
        && ind.ema_fast > ind.ema_slow
        && ind.rsi > RSI_MIDLINE
        && bar.close <= ind.band_lower
}

fn is_short_entry(bar: &Bar) -> bool {
    let ind = &bar.indicators;
    bar.close < ind.ema_slow
        && ind.ema_fast < ind.ema_slow
        && ind.rsi < RSI_MIDLINE
        && bar.close >= ind.band_upper
}
