//! Trade log CSV writer implementing ReportPort.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BandtraderError;
use crate::domain::position::{ExitReason, Side};
use crate::ports::report_port::ReportPort;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::Path;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Serialize)]
struct TradeRow {
    entry_time: String,
    exit_time: String,
    side: Side,
    entry_price: f64,
    exit_price: f64,
    profit: Decimal,
    exit_reason: ExitReason,
    balance_after: Decimal,
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn write_to<W: std::io::Write>(
        result: &BacktestResult,
        writer: W,
    ) -> Result<(), BandtraderError> {
        let mut wtr = csv::Writer::from_writer(writer);
        let ledger = &result.ledger;

        for (trade, point) in ledger.trades().iter().zip(ledger.balance_series()) {
            wtr.serialize(TradeRow {
                entry_time: trade.entry_timestamp.format(TIME_FORMAT).to_string(),
                exit_time: trade.exit_timestamp.format(TIME_FORMAT).to_string(),
                side: trade.side,
                entry_price: trade.entry_price,
                exit_price: trade.exit_price,
                profit: trade.realized_profit.normalize(),
                exit_reason: trade.exit_reason,
                balance_after: point.balance.normalize(),
            })
            .map_err(csv_error)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> BandtraderError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => BandtraderError::Io(io),
        other => BandtraderError::data(format!("CSV write error: {:?}", other)),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BandtraderError> {
        let file = std::fs::File::create(output_path)?;
        Self::write_to(result, file)
    }
}
