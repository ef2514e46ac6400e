//! Attaches indicator values to raw bars and drops the warm-up prefix.

use log::{debug, warn};

use crate::domain::error::BandtraderError;
use crate::domain::indicator::bollinger::bollinger;
use crate::domain::indicator::ema::ema;
use crate::domain::indicator::rsi::rsi;
use crate::domain::indicator::IndicatorParams;
use crate::domain::ohlcv::{Bar, Indicators, OhlcvBar};

/// Warm-up actually applied: the configured value, but never fewer bars
/// than the indicators need.
pub fn effective_warmup(params: &IndicatorParams, configured: Option<usize>) -> usize {
    let needed = params.warmup_bars();
    configured.map_or(needed, |c| c.max(needed))
}

/// Compute indicators over `raw` and return the bars from index `warmup`
/// onward with their values attached.
pub fn attach_indicators(
    raw: &[OhlcvBar],
    params: &IndicatorParams,
    warmup: usize,
) -> Result<Vec<Bar>, BandtraderError> {
    if raw.len() <= warmup {
        warn!(
            "only {} bars loaded, warm-up needs {}; nothing to simulate",
            raw.len(),
            warmup
        );
        return Ok(Vec::new());
    }

    let closes: Vec<f64> = raw.iter().map(|b| b.close).collect();
    let ema_fast = ema(&closes, params.ema_fast);
    let ema_slow = ema(&closes, params.ema_slow);
    let rsi_values = rsi(&closes, params.rsi_period);
    let bands = bollinger(&closes, params.bollinger_period, params.bollinger_stddev);

    debug!("computed {} over {} bars", params, raw.len());

    raw.iter()
        .enumerate()
        .skip(warmup)
        .map(|(i, bar)| {
            let missing = |field| BandtraderError::MissingIndicator {
                timestamp: bar.timestamp,
                field,
            };
            let band = bands[i].ok_or_else(|| missing("bollinger"))?;
            let indicators = Indicators {
                ema_fast: ema_fast[i].ok_or_else(|| missing("ema_fast"))?,
                ema_slow: ema_slow[i].ok_or_else(|| missing("ema_slow"))?,
                rsi: rsi_values[i].ok_or_else(|| missing("rsi"))?,
                band_lower: band.lower,
                band_upper: band.upper,
            };
            Ok(Bar::from_ohlcv(bar, indicators))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(i: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + chrono::Duration::minutes(15 * i as i64)
    }

    fn make_bars(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let close = 100.0 + ((i % 9) as f64 - 4.0) * 0.5 + i as f64 * 0.1;
                OhlcvBar {
                    timestamp: ts(i),
                    open: close,
                    high: close + 0.3,
                    low: close - 0.3,
                    close,
                    volume: 10,
                }
            })
            .collect()
    }

    fn small_params() -> IndicatorParams {
        IndicatorParams {
            ema_fast: 3,
            ema_slow: 6,
            rsi_period: 4,
            bollinger_period: 5,
            bollinger_stddev: 2.0,
        }
    }

    #[test]
    fn drops_warmup_and_defines_everything() {
        let raw = make_bars(20);
        let params = small_params();
        let bars = attach_indicators(&raw, &params, params.warmup_bars()).unwrap();

        assert_eq!(bars.len(), 14);
        assert_eq!(bars[0].timestamp, ts(6));
        assert!(bars.iter().all(|b| b.indicators.first_undefined().is_none()));
    }

    #[test]
    fn band_straddles_middle() {
        let raw = make_bars(20);
        let params = small_params();
        for bar in attach_indicators(&raw, &params, 6).unwrap() {
            assert!(bar.indicators.band_lower <= bar.indicators.band_upper);
        }
    }

    #[test]
    fn too_few_bars_yields_empty() {
        let raw = make_bars(6);
        let bars = attach_indicators(&raw, &small_params(), 6).unwrap();
        assert!(bars.is_empty());
    }

    #[test]
    fn warmup_shorter_than_needed_is_an_error() {
        let raw = make_bars(20);
        let err = attach_indicators(&raw, &small_params(), 2).unwrap_err();
        assert!(matches!(err, BandtraderError::MissingIndicator { .. }));
    }

    #[test]
    fn effective_warmup_never_below_need() {
        let params = small_params();
        assert_eq!(effective_warmup(&params, None), 6);
        assert_eq!(effective_warmup(&params, Some(3)), 6);
        assert_eq!(effective_warmup(&params, Some(10)), 10);
    }
}
