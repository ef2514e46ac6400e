//! Open position and closed trade records.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "SL"),
            ExitReason::TakeProfit => write!(f, "TP"),
            ExitReason::EndOfData => write!(f, "END"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub entry_timestamp: NaiveDateTime,
}

impl Position {
    pub fn should_stop_loss(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price <= self.stop_loss,
            Side::Short => price >= self.stop_loss,
        }
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        match self.side {
            Side::Long => price >= self.take_profit,
            Side::Short => price <= self.take_profit,
        }
    }

    /// Signed profit of closing at `exit_price`.
    /// (exit - entry) * lot * multiplier for longs, mirrored for shorts.
    pub fn profit_at(
        &self,
        exit_price: f64,
        lot_size: Decimal,
        contract_multiplier: Decimal,
    ) -> Decimal {
        let entry = price_to_decimal(self.entry_price);
        let exit = price_to_decimal(exit_price);
        let points = match self.side {
            Side::Long => exit - entry,
            Side::Short => entry - exit,
        };
        points * lot_size * contract_multiplier
    }
}

/// Price as an account-currency amount. Bars reaching the engine have
/// passed `validate_bars`, whose price check guarantees the conversion.
pub fn price_to_decimal(price: f64) -> Decimal {
    Decimal::from_f64(price).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub realized_profit: Decimal,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn holding_time(&self) -> chrono::Duration {
        self.exit_timestamp - self.entry_timestamp
    }
}
