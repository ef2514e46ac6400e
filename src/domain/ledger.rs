//! Account balance and append-only trade log.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::position::Trade;

/// Account balance after a closed trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancePoint {
    pub timestamp: NaiveDateTime,
    pub balance: Decimal,
}

/// Owns the closed trades of a run and the balance they produce.
///
/// Trades can only be appended; the balance moves by exactly each
/// trade's realized profit. Amounts are decimal, so the sum of profits
/// and the balance delta never drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    initial_balance: Decimal,
    balance: Decimal,
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new(initial_balance: Decimal) -> Self {
        Ledger {
            initial_balance,
            balance: initial_balance,
            trades: Vec::new(),
        }
    }

    pub fn append(&mut self, trade: Trade) {
        debug_assert!(
            trade.exit_timestamp >= trade.entry_timestamp,
            "trade exits at {} before its entry at {}",
            trade.exit_timestamp,
            trade.entry_timestamp
        );
        self.balance += trade.realized_profit;
        self.trades.push(trade);
    }

    pub fn initial_balance(&self) -> Decimal {
        self.initial_balance
    }

    /// Running balance after every appended trade.
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn total_profit(&self) -> Decimal {
        self.trades.iter().map(|t| t.realized_profit).sum()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// One point per trade, in append order. Each call starts over from
    /// the initial balance.
    pub fn balance_series(&self) -> BalanceSeries<'_> {
        BalanceSeries {
            trades: self.trades.iter(),
            balance: self.initial_balance,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BalanceSeries<'a> {
    trades: std::slice::Iter<'a, Trade>,
    balance: Decimal,
}

impl Iterator for BalanceSeries<'_> {
    type Item = BalancePoint;

    fn next(&mut self) -> Option<BalancePoint> {
        let trade = self.trades.next()?;
        self.balance += trade.realized_profit;
        Some(BalancePoint {
            timestamp: trade.exit_timestamp,
            balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.trades.size_hint()
    }
}

impl ExactSizeIterator for BalanceSeries<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{ExitReason, Side};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn ts(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn trade(entry_hour: u32, exit_hour: u32, profit: Decimal) -> Trade {
        Trade {
            entry_timestamp: ts(entry_hour),
            exit_timestamp: ts(exit_hour),
            side: Side::Long,
            entry_price: 2000.0,
            exit_price: 2001.0,
            realized_profit: profit,
            exit_reason: ExitReason::TakeProfit,
        }
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new(dec!(10000));
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.balance(), dec!(10000));
        assert_eq!(ledger.initial_balance(), dec!(10000));
        assert_eq!(ledger.total_profit(), Decimal::ZERO);
        assert_eq!(ledger.balance_series().count(), 0);
    }

    #[test]
    fn append_moves_balance_by_profit() {
        let mut ledger = Ledger::new(dec!(10000));
        ledger.append(trade(1, 2, dec!(-50)));
        ledger.append(trade(3, 5, dec!(100)));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.balance(), dec!(10050));
        assert_eq!(ledger.total_profit(), dec!(50));
        assert_eq!(ledger.total_profit(), ledger.balance() - ledger.initial_balance());
    }

    #[test]
    fn profit_sum_equals_balance_delta_exactly() {
        // binary floats drift on amounts like these
        let mut ledger = Ledger::new(dec!(10000));
        let profits = [
            dec!(0.1),
            dec!(0.2),
            dec!(0.3),
            dec!(-0.7),
            dec!(0.123456789),
            dec!(33.33),
        ];
        for (i, profit) in profits.into_iter().enumerate() {
            let hour = 2 * i as u32;
            ledger.append(trade(hour, hour + 1, profit));
        }

        assert_eq!(ledger.total_profit(), dec!(33.353456789));
        assert_eq!(ledger.total_profit(), ledger.balance() - ledger.initial_balance());
        assert_eq!(ledger.balance(), dec!(10033.353456789));
    }

    #[test]
    fn trades_keep_append_order() {
        let mut ledger = Ledger::new(Decimal::ZERO);
        ledger.append(trade(1, 2, dec!(1)));
        ledger.append(trade(3, 4, dec!(2)));
        let exits: Vec<_> = ledger.trades().iter().map(|t| t.exit_timestamp).collect();
        assert_eq!(exits, vec![ts(2), ts(4)]);
    }

    #[test]
    fn balance_series_is_cumulative() {
        let mut ledger = Ledger::new(dec!(10000));
        ledger.append(trade(1, 2, dec!(-50)));
        ledger.append(trade(3, 5, dec!(100)));
        ledger.append(trade(6, 7, dec!(25)));

        let series: Vec<BalancePoint> = ledger.balance_series().collect();
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].timestamp, ts(2));
        assert_eq!(series[0].balance, dec!(9950));
        assert_eq!(series[1].balance, dec!(10050));
        assert_eq!(series[2].timestamp, ts(7));
        assert_eq!(series[2].balance, ledger.balance());
    }

    #[test]
    fn balance_series_is_restartable() {
        let mut ledger = Ledger::new(dec!(500));
        ledger.append(trade(1, 2, dec!(10)));
        ledger.append(trade(3, 4, dec!(-5)));

        let series = ledger.balance_series();
        assert_eq!(series.len(), 2);
        let first: Vec<_> = series.clone().collect();
        let second: Vec<_> = series.collect();
        assert_eq!(first, second);
        assert_eq!(first, ledger.balance_series().collect::<Vec<_>>());
    }
}
