//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BandtraderError;
use std::path::Path;

/// Port for rendering a finished run. Implementations only read the
/// trade log and balance series.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BandtraderError>;
}
