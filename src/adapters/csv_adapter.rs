//! CSV file bar source.
//!
//! Columns are matched by header name, case-insensitively: `time`, `open`,
//! `high`, `low`, `close` and optionally `volume` or `tick_volume`. Other
//! columns (such as `spread`) are ignored. `time` may be unix seconds or
//! an ISO-like date/time.

use crate::domain::error::BandtraderError;
use crate::domain::ohlcv::{parse_timestamp, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Option<i64>,
    tick_volume: Option<i64>,
}

/// Reads bars from a single CSV file, or from `<dir>/<SYMBOL>.csv` when
/// constructed with a directory.
pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", symbol))
        } else {
            self.path.clone()
        }
    }

    fn read_all(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BandtraderError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| {
            BandtraderError::data(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::Reader::from_reader(file);
        let headers: csv::StringRecord = rdr
            .headers()
            .map_err(|e| BandtraderError::data(format!("CSV header error: {}", e)))?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        rdr.set_headers(headers);

        let mut bars = Vec::new();
        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| BandtraderError::data(format!("CSV parse error: {}", e)))?;
            let timestamp = parse_timestamp(&row.time).ok_or_else(|| {
                BandtraderError::data(format!(
                    "invalid time '{}' on data row {}",
                    row.time,
                    line + 1
                ))
            })?;
            bars.push(OhlcvBar {
                timestamp,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.or(row.tick_volume).unwrap_or(0),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(dup) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(BandtraderError::data(format!(
                "duplicate bar timestamp {} in {}",
                dup[0].timestamp,
                path.display()
            )));
        }
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, BandtraderError> {
        let bars = self
            .read_all(symbol)?
            .into_iter()
            .filter(|b| start.is_none_or(|s| b.timestamp >= s))
            .filter(|b| end.is_none_or(|e| b.timestamp <= e))
            .collect();
        Ok(bars)
    }
}
