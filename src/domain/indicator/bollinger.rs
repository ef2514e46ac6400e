//! Bollinger Bands.
//!
//! Middle is the simple moving average over `period` closes; the bands sit
//! `stddev_mult` population standard deviations above and below it.
//! The first value is defined at index `period - 1`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub middle: f64,
    pub upper: f64,
}

pub fn bollinger(closes: &[f64], period: usize, stddev_mult: f64) -> Vec<Option<Band>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    (0..closes.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &closes[i + 1 - period..=i];
            let middle = window.iter().sum::<f64>() / period as f64;
            let variance = window
                .iter()
                .map(|c| {
                    let diff = c - middle;
                    diff * diff
                })
                .sum::<f64>()
                / period as f64;
            let width = stddev_mult * variance.sqrt();
            Some(Band {
                lower: middle - width,
                middle,
                upper: middle + width,
            })
        })
        .collect()
}
