//! Configuration access port trait.

use rust_decimal::Decimal;

use crate::domain::error::BandtraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Parsed float, `Ok(None)` when the key is absent.
    fn get_double(&self, section: &str, key: &str) -> Result<Option<f64>, BandtraderError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                BandtraderError::invalid(section, key, format!("'{}' is not a number", raw.trim()))
            }),
        }
    }

    /// Parsed decimal amount for money and sizes, `Ok(None)` when absent.
    fn get_decimal(&self, section: &str, key: &str) -> Result<Option<Decimal>, BandtraderError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<Decimal>().map(Some).map_err(|_| {
                BandtraderError::invalid(
                    section,
                    key,
                    format!("'{}' is not a decimal number", raw.trim()),
                )
            }),
        }
    }

    /// Parsed non-negative integer, `Ok(None)` when the key is absent.
    fn get_usize(&self, section: &str, key: &str) -> Result<Option<usize>, BandtraderError> {
        match self.get_string(section, key) {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
                BandtraderError::invalid(
                    section,
                    key,
                    format!("'{}' is not a non-negative integer", raw.trim()),
                )
            }),
        }
    }

    fn double_or(&self, section: &str, key: &str, default: f64) -> Result<f64, BandtraderError> {
        Ok(self.get_double(section, key)?.unwrap_or(default))
    }

    fn decimal_or(&self, section: &str, key: &str, default: Decimal) -> Result<Decimal, BandtraderError> {
        Ok(self.get_decimal(section, key)?.unwrap_or(default))
    }

    fn usize_or(&self, section: &str, key: &str, default: usize) -> Result<usize, BandtraderError> {
        Ok(self.get_usize(section, key)?.unwrap_or(default))
    }
}
