//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod ledger;
pub mod signal;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
