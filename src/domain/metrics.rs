//! Trade statistics over a finished run.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::ledger::Ledger;
use super::position::ExitReason;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub trades_breakeven: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    pub largest_win: Decimal,
    pub largest_loss: Decimal,
    /// Largest peak-to-trough fall of the balance, as a fraction of the peak.
    pub max_drawdown: f64,
    pub avg_holding_minutes: f64,
    pub stop_loss_exits: usize,
    pub take_profit_exits: usize,
    pub end_of_data_exits: usize,
}

impl TradeStats {
    pub fn compute(ledger: &Ledger) -> Self {
        let trades = ledger.trades();

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        let mut trades_breakeven = 0usize;
        let mut total_wins = Decimal::ZERO;
        let mut total_losses = Decimal::ZERO;
        let mut largest_win = Decimal::ZERO;
        let mut largest_loss = Decimal::ZERO;
        let mut total_minutes = 0i64;
        let mut stop_loss_exits = 0usize;
        let mut take_profit_exits = 0usize;
        let mut end_of_data_exits = 0usize;

        for trade in trades {
            let pnl = trade.realized_profit;
            if pnl > Decimal::ZERO {
                trades_won += 1;
                total_wins += pnl;
                largest_win = largest_win.max(pnl);
            } else if pnl < Decimal::ZERO {
                trades_lost += 1;
                total_losses += pnl.abs();
                largest_loss = largest_loss.max(pnl.abs());
            } else {
                trades_breakeven += 1;
            }

            total_minutes += trade.holding_time().num_minutes();

            match trade.exit_reason {
                ExitReason::StopLoss => stop_loss_exits += 1,
                ExitReason::TakeProfit => take_profit_exits += 1,
                ExitReason::EndOfData => end_of_data_exits += 1,
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let profit_factor = if total_losses > Decimal::ZERO {
            ratio(total_wins, total_losses)
        } else if total_wins > Decimal::ZERO {
            f64::INFINITY
        } else {
            0.0
        };

        let avg_win = if trades_won > 0 {
            total_wins / Decimal::from(trades_won)
        } else {
            Decimal::ZERO
        };

        let avg_loss = if trades_lost > 0 {
            total_losses / Decimal::from(trades_lost)
        } else {
            Decimal::ZERO
        };

        let avg_holding_minutes = if total_trades > 0 {
            total_minutes as f64 / total_trades as f64
        } else {
            0.0
        };

        TradeStats {
            total_trades,
            trades_won,
            trades_lost,
            trades_breakeven,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            max_drawdown: compute_drawdown(ledger),
            avg_holding_minutes,
            stop_loss_exits,
            take_profit_exits,
            end_of_data_exits,
        }
    }
}

/// Drawdown over the balance series, with the initial balance as the
/// first peak.
fn compute_drawdown(ledger: &Ledger) -> f64 {
    let mut peak = ledger.initial_balance();
    let mut max_dd = Decimal::ZERO;

    for point in ledger.balance_series() {
        if point.balance > peak {
            peak = point.balance;
        } else if peak > Decimal::ZERO {
            max_dd = max_dd.max((peak - point.balance) / peak);
        }
    }

    max_dd.to_f64().unwrap_or_default()
}

/// `num / den` as a plain ratio; `den` must be non-zero.
fn ratio(num: Decimal, den: Decimal) -> f64 {
    (num / den).to_f64().unwrap_or_default()
}
