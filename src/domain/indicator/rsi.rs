//! Relative Strength Index over a running moving average (RMA).
//!
//! Gains and losses are close-to-close changes. Each is averaged with an
//! adjusted exponential mean, `alpha = 1 / period`: every change seen so far
//! is weighted by `(1 - alpha)^age` and the weights are renormalised.
//! RSI = 100 * avg_gain / (avg_gain + avg_loss). A window with no movement
//! at all reads 50. The first value is defined at index `period`.

pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let decay = 1.0 - 1.0 / period as f64;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut weight = 0.0;

    for (i, pair) in closes.windows(2).enumerate() {
        let change = pair[1] - pair[0];
        gain_sum = change.max(0.0) + decay * gain_sum;
        loss_sum = (-change).max(0.0) + decay * loss_sum;
        weight = 1.0 + decay * weight;

        if i + 1 >= period {
            out[i + 1] = Some(rsi_value(gain_sum / weight, loss_sum / weight));
        }
    }

    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let total = avg_gain + avg_loss;
    if total == 0.0 {
        50.0
    } else {
        100.0 * avg_gain / total
    }
}
