//! Per-bar position state machine.
//!
//! The engine is either flat or holding exactly one position. [`step`]
//! advances it by one bar:
//!
//! - flat: evaluate the entry signal and open at the bar close
//! - holding: stop-loss is tested before take-profit, so a bar that
//!   touches both thresholds always exits at the stop
//!
//! Exits fill at the threshold price, not the bar close. Whatever is
//! still open after the last bar is closed by [`liquidate`] at that bar's
//! close.

use super::backtest::BacktestConfig;
use super::ohlcv::Bar;
use super::position::{ExitReason, Position, Side, Trade};
use super::signal::{self, Signal};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EngineState {
    #[default]
    Flat,
    Holding(Position),
}

impl EngineState {
    pub fn is_flat(&self) -> bool {
        matches!(self, EngineState::Flat)
    }

    pub fn position(&self) -> Option<&Position> {
        match self {
            EngineState::Flat => None,
            EngineState::Holding(p) => Some(p),
        }
    }
}

/// Advance the state machine by one bar.
pub fn step(state: EngineState, bar: &Bar, config: &BacktestConfig) -> (EngineState, Option<Trade>) {
    match state {
        EngineState::Flat => match signal::evaluate(bar) {
            Signal::EnterLong => (EngineState::Holding(open_position(Side::Long, bar, config)), None),
            Signal::EnterShort => (EngineState::Holding(open_position(Side::Short, bar, config)), None),
            Signal::NoSignal => (EngineState::Flat, None),
        },
        EngineState::Holding(position) => match check_exit(&position, bar.close) {
            Some((exit_price, reason)) => {
                let trade = close_position(position, exit_price, bar, reason, config);
                (EngineState::Flat, Some(trade))
            }
            None => (EngineState::Holding(position), None),
        },
    }
}

/// Close any open position at the last bar's close.
pub fn liquidate(state: EngineState, last_bar: &Bar, config: &BacktestConfig) -> Option<Trade> {
    match state {
        EngineState::Flat => None,
        EngineState::Holding(position) => Some(close_position(
            position,
            last_bar.close,
            last_bar,
            ExitReason::EndOfData,
            config,
        )),
    }
}

/// Open a position at the bar close with thresholds offset from it.
pub fn open_position(side: Side, bar: &Bar, config: &BacktestConfig) -> Position {
    let entry_price = bar.close;
    let sl = config.stop_loss_offset();
    let tp = config.take_profit_offset();

    let (stop_loss, take_profit) = match side {
        Side::Long => (entry_price - sl, entry_price + tp),
        Side::Short => (entry_price + sl, entry_price - tp),
    };

    Position {
        side,
        entry_price,
        stop_loss,
        take_profit,
        entry_timestamp: bar.timestamp,
    }
}

/// Exit price and reason if `close` touches a threshold, stop-loss first.
pub fn check_exit(position: &Position, close: f64) -> Option<(f64, ExitReason)> {
    if position.should_stop_loss(close) {
        Some((position.stop_loss, ExitReason::StopLoss))
    } else if position.should_take_profit(close) {
        Some((position.take_profit, ExitReason::TakeProfit))
    } else {
        None
    }
}

fn close_position(
    position: Position,
    exit_price: f64,
    bar: &Bar,
    exit_reason: ExitReason,
    config: &BacktestConfig,
) -> Trade {
    let realized_profit =
        position.profit_at(exit_price, config.lot_size, config.contract_multiplier);

    Trade {
        entry_timestamp: position.entry_timestamp,
        exit_timestamp: bar.timestamp,
        side: position.side,
        entry_price: position.entry_price,
        exit_price,
        realized_profit,
        exit_reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::Indicators;
    use approx::assert_abs_diff_eq;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;

    fn ts(i: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(15 * i)
    }

    fn config() -> BacktestConfig {
        BacktestConfig {
            initial_balance: dec!(10000),
            lot_size: dec!(0.1),
            stop_loss_distance: 500.0,
            take_profit_distance: 1000.0,
            contract_multiplier: dec!(100),
            price_increment: 0.01,
        }
    }

    fn neutral(i: i64, close: f64) -> Bar {
        Bar {
            timestamp: ts(i),
            open: close,
            high: close,
            low: close,
            close,
            indicators: Indicators {
                ema_fast: close,
                ema_slow: close,
                rsi: 50.0,
                band_lower: close - 10.0,
                band_upper: close + 10.0,
            },
        }
    }

    fn long_entry(i: i64, close: f64) -> Bar {
        let mut bar = neutral(i, close);
        bar.indicators = Indicators {
            ema_fast: close - 5.0,
            ema_slow: close - 10.0,
            rsi: 60.0,
            band_lower: close,
            band_upper: close + 20.0,
        };
        bar
    }

    fn short_entry(i: i64, close: f64) -> Bar {
        let mut bar = neutral(i, close);
        bar.indicators = Indicators {
            ema_fast: close + 5.0,
            ema_slow: close + 10.0,
            rsi: 40.0,
            band_lower: close - 20.0,
            band_upper: close,
        };
        bar
    }

    #[test]
    fn flat_without_signal_stays_flat() {
        let (state, trade) = step(EngineState::Flat, &neutral(0, 2000.0), &config());
        assert!(state.is_flat());
        assert!(trade.is_none());
    }

    #[test]
    fn long_entry_sets_thresholds() {
        let (state, trade) = step(EngineState::Flat, &long_entry(0, 2000.0), &config());
        assert!(trade.is_none());
        let pos = state.position().expect("should hold a position");
        assert_eq!(pos.side, Side::Long);
        assert_eq!(pos.entry_timestamp, ts(0));
        assert_abs_diff_eq!(pos.entry_price, 2000.0);
        assert_abs_diff_eq!(pos.stop_loss, 1995.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.take_profit, 2010.0, epsilon = 1e-9);
    }

    #[test]
    fn short_entry_sets_thresholds() {
        let (state, _) = step(EngineState::Flat, &short_entry(0, 2000.0), &config());
        let pos = state.position().expect("should hold a position");
        assert_eq!(pos.side, Side::Short);
        assert_abs_diff_eq!(pos.stop_loss, 2005.0, epsilon = 1e-9);
        assert_abs_diff_eq!(pos.take_profit, 1990.0, epsilon = 1e-9);
    }

    #[test]
    fn long_stop_loss_fills_at_threshold() {
        let cfg = config();
        let (state, _) = step(EngineState::Flat, &long_entry(0, 2000.0), &cfg);
        let (state, trade) = step(state, &neutral(1, 1994.5), &cfg);

        assert!(state.is_flat());
        let trade = trade.expect("stop-loss should close the trade");
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_abs_diff_eq!(trade.exit_price, 1995.0, epsilon = 1e-9);
        assert_eq!(trade.realized_profit, dec!(-50));
        assert_eq!(trade.exit_timestamp, ts(1));
        assert_eq!(trade.entry_timestamp, ts(0));
    }

    #[test]
    fn short_take_profit_fills_at_threshold() {
        let cfg = config();
        let (state, _) = step(EngineState::Flat, &short_entry(0, 2000.0), &cfg);
        let (state, trade) = step(state, &neutral(1, 1990.0), &cfg);

        assert!(state.is_flat());
        let trade = trade.expect("take-profit should close the trade");
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_abs_diff_eq!(trade.exit_price, 1990.0, epsilon = 1e-9);
        assert_eq!(trade.realized_profit, dec!(100));
    }

    #[test]
    fn stop_loss_wins_when_both_thresholds_touched() {
        // crossed thresholds: a single close satisfies both tests
        let position = Position {
            side: Side::Long,
            entry_price: 2000.0,
            stop_loss: 2005.0,
            take_profit: 1998.0,
            entry_timestamp: ts(0),
        };
        let (state, trade) = step(EngineState::Holding(position), &neutral(1, 2000.0), &config());
        assert!(state.is_flat());
        let trade = trade.unwrap();
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.exit_price, 2005.0);
    }

    #[test]
    fn holding_ignores_new_signals() {
        let cfg = config();
        let (state, _) = step(EngineState::Flat, &long_entry(0, 2000.0), &cfg);
        let before = state.clone();
        let (state, trade) = step(state, &short_entry(1, 2001.0), &cfg);
        assert!(trade.is_none());
        assert_eq!(state, before);
        let (state, trade) = step(state, &long_entry(2, 2002.0), &cfg);
        assert!(trade.is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn holding_without_touch_is_unchanged() {
        let cfg = config();
        let (state, _) = step(EngineState::Flat, &long_entry(0, 2000.0), &cfg);
        let (next, trade) = step(state.clone(), &neutral(1, 2009.99), &cfg);
        assert!(trade.is_none());
        assert_eq!(next, state);
    }

    #[test]
    fn liquidate_closes_at_last_close() {
        let cfg = config();
        let (state, _) = step(EngineState::Flat, &short_entry(0, 2000.0), &cfg);
        let last = neutral(7, 1996.0);
        let trade = liquidate(state, &last, &cfg).expect("open position must be closed");
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
        assert_eq!(trade.exit_timestamp, ts(7));
        assert_eq!(trade.exit_price, 1996.0);
        assert_eq!(trade.realized_profit, dec!(40));
    }

    #[test]
    fn liquidate_flat_is_noop() {
        assert!(liquidate(EngineState::Flat, &neutral(0, 2000.0), &config()).is_none());
    }

    #[test]
    fn check_exit_none_between_thresholds() {
        let pos = open_position(Side::Long, &neutral(0, 2000.0), &config());
        assert_eq!(check_exit(&pos, 2000.0), None);
        assert_eq!(check_exit(&pos, 2010.0), Some((pos.take_profit, ExitReason::TakeProfit)));
    }
}
