//! Exponential moving average.
//!
//! Seeded with the simple average of the first `period` closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k) with k = 2/(period+1).
//! The first value is defined at index `period - 1`.

pub fn ema(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(closes.len());
    let mut sum = 0.0;
    let mut prev = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        if i + 1 < period {
            sum += close;
            out.push(None);
        } else if i + 1 == period {
            sum += close;
            prev = sum / period as f64;
            out.push(Some(prev));
        } else {
            prev = close * k + prev * (1.0 - k);
            out.push(Some(prev));
        }
    }

    out
}
