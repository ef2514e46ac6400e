//! bandtrader: single-instrument EMA/RSI/Bollinger backtester.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], argument handling in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
