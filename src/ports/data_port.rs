//! Bar source port trait.

use crate::domain::error::BandtraderError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Bars for `symbol` inside the optional inclusive window, sorted by
    /// timestamp.
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, BandtraderError>;

    /// First timestamp, last timestamp and bar count, or `None` if the
    /// source holds no bars.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, BandtraderError> {
        let bars = self.fetch_ohlcv(symbol, None, None)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp, bars.len())),
            _ => None,
        })
    }
}
