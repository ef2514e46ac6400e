//! Configuration validation.
//!
//! Validates every config field before a backtest runs.

use rust_decimal::Decimal;

use crate::domain::error::BandtraderError;
use crate::domain::ohlcv::parse_timestamp;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    validate_backtest_section(config)?;
    validate_instrument_section(config)?;
    validate_indicator_section(config)?;
    validate_data_window(config)?;
    Ok(())
}

fn require_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), BandtraderError> {
    if let Some(value) = config.get_double(section, key)? {
        if !(value.is_finite() && value > 0.0) {
            return Err(BandtraderError::invalid(
                section,
                key,
                format!("{key} must be positive"),
            ));
        }
    }
    Ok(())
}

fn require_positive_amount(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), BandtraderError> {
    if let Some(value) = config.get_decimal(section, key)? {
        if value <= Decimal::ZERO {
            return Err(BandtraderError::invalid(
                section,
                key,
                format!("{key} must be positive"),
            ));
        }
    }
    Ok(())
}

fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    // any sign is accepted, it only has to be a decimal amount
    config.get_decimal("backtest", "initial_balance")?;
    require_positive_amount(config, "backtest", "lot_size")?;
    require_positive(config, "backtest", "stop_loss_distance")?;
    require_positive(config, "backtest", "take_profit_distance")?;
    config.get_usize("backtest", "warmup_bars")?;
    Ok(())
}

fn validate_instrument_section(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    require_positive(config, "instrument", "price_increment")?;
    require_positive_amount(config, "instrument", "contract_multiplier")?;
    Ok(())
}

fn validate_indicator_section(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    for key in ["ema_fast", "ema_slow", "rsi_period", "bollinger_period"] {
        if config.get_usize("indicators", key)? == Some(0) {
            return Err(BandtraderError::invalid(
                "indicators",
                key,
                format!("{key} must be at least 1"),
            ));
        }
    }

    let fast = config.usize_or("indicators", "ema_fast", 50)?;
    let slow = config.usize_or("indicators", "ema_slow", 200)?;
    if fast >= slow {
        return Err(BandtraderError::invalid(
            "indicators",
            "ema_fast",
            "ema_fast must be shorter than ema_slow",
        ));
    }

    require_positive(config, "indicators", "bollinger_stddev")?;
    Ok(())
}

fn validate_data_window(config: &dyn ConfigPort) -> Result<(), BandtraderError> {
    let parse = |key: &str| -> Result<_, BandtraderError> {
        match config.get_string("data", key) {
            None => Ok(None),
            Some(raw) => parse_timestamp(&raw).map(Some).ok_or_else(|| {
                BandtraderError::invalid(
                    "data",
                    key,
                    format!("invalid {key} '{raw}', expected YYYY-MM-DD[ HH:MM:SS]"),
                )
            }),
        }
    };

    if let (Some(start), Some(end)) = (parse("start")?, parse("end")?) {
        if start >= end {
            return Err(BandtraderError::invalid(
                "data",
                "start",
                "start must be before end",
            ));
        }
    }
    Ok(())
}
