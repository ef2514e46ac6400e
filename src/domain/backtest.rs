//! Backtest configuration and the simulation loop.

use chrono::NaiveDateTime;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::BandtraderError;
use super::execution::{self, EngineState};
use super::ledger::Ledger;
use super::ohlcv::Bar;

/// Parameters fixed for the whole run. Distances are in price increments
/// (points); `price_increment` converts them into price units. Money and
/// the amounts that scale it are decimal.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_balance: Decimal,
    pub lot_size: Decimal,
    pub stop_loss_distance: f64,
    pub take_profit_distance: f64,
    pub contract_multiplier: Decimal,
    pub price_increment: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_balance: dec!(10000),
            lot_size: dec!(0.1),
            stop_loss_distance: 500.0,
            take_profit_distance: 1000.0,
            contract_multiplier: dec!(100),
            price_increment: 0.01,
        }
    }
}

impl BacktestConfig {
    pub fn stop_loss_offset(&self) -> f64 {
        self.stop_loss_distance * self.price_increment
    }

    pub fn take_profit_offset(&self) -> f64 {
        self.take_profit_distance * self.price_increment
    }

    /// Any initial balance is accepted; every size and distance must be
    /// positive.
    pub fn validate(&self) -> Result<(), BandtraderError> {
        let amounts = [
            ("backtest", "lot_size", self.lot_size),
            ("instrument", "contract_multiplier", self.contract_multiplier),
        ];
        for (section, key, value) in amounts {
            if value <= Decimal::ZERO {
                return Err(not_positive(section, key));
            }
        }
        let distances = [
            ("backtest", "stop_loss_distance", self.stop_loss_distance),
            ("backtest", "take_profit_distance", self.take_profit_distance),
            ("instrument", "price_increment", self.price_increment),
        ];
        for (section, key, value) in distances {
            if !(value.is_finite() && value > 0.0) {
                return Err(not_positive(section, key));
            }
        }
        Ok(())
    }
}

fn not_positive(section: &str, key: &str) -> BandtraderError {
    BandtraderError::invalid(section, key, format!("{key} must be positive"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub ledger: Ledger,
    pub bars_processed: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
}

impl BacktestResult {
    pub fn final_balance(&self) -> Decimal {
        self.ledger.balance()
    }

    pub fn total_profit(&self) -> Decimal {
        self.ledger.total_profit()
    }
}

/// Check the engine's input contract: strictly increasing timestamps,
/// positive prices and every indicator defined.
pub fn validate_bars(bars: &[Bar]) -> Result<(), BandtraderError> {
    for (i, bar) in bars.iter().enumerate() {
        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            return Err(BandtraderError::NonMonotonicTimestamp {
                index: i,
                previous: bars[i - 1].timestamp,
                current: bar.timestamp,
            });
        }
        if let Some(field) = bar.first_invalid_price() {
            return Err(BandtraderError::InvalidPrice {
                timestamp: bar.timestamp,
                field,
            });
        }
        if let Some(field) = bar.indicators.first_undefined() {
            return Err(BandtraderError::MissingIndicator {
                timestamp: bar.timestamp,
                field,
            });
        }
    }
    Ok(())
}

/// Replay `bars` through the position state machine.
///
/// The bars must already exclude the indicator warm-up. Input is checked
/// up front; nothing is simulated if any bar breaks the contract.
pub fn run_backtest(bars: &[Bar], config: &BacktestConfig) -> Result<BacktestResult, BandtraderError> {
    config.validate()?;
    validate_bars(bars)?;

    let mut ledger = Ledger::new(config.initial_balance);
    let mut state = EngineState::Flat;

    for bar in bars {
        let was_flat = state.is_flat();
        let (next, closed) = execution::step(state, bar, config);

        if let Some(trade) = closed {
            debug!(
                "{} closed by {} at {} on {} (profit {:.2})",
                trade.side, trade.exit_reason, trade.exit_price, trade.exit_timestamp, trade.realized_profit
            );
            ledger.append(trade);
        } else if was_flat {
            if let Some(pos) = next.position() {
                debug!(
                    "{} opened at {} on {} (sl {}, tp {})",
                    pos.side, pos.entry_price, pos.entry_timestamp, pos.stop_loss, pos.take_profit
                );
            }
        }
        state = next;
    }

    if let Some(last) = bars.last() {
        if let Some(trade) = execution::liquidate(state, last, config) {
            debug!(
                "{} closed at end of data at {} on {} (profit {:.2})",
                trade.side, trade.exit_price, trade.exit_timestamp, trade.realized_profit
            );
            ledger.append(trade);
        }
    }

    info!(
        "backtest finished: {} bars, {} trades, final balance {:.2}",
        bars.len(),
        ledger.len(),
        ledger.balance()
    );

    Ok(BacktestResult {
        ledger,
        bars_processed: bars.len(),
        first_timestamp: bars.first().map(|b| b.timestamp),
        last_timestamp: bars.last().map(|b| b.timestamp),
    })
}
