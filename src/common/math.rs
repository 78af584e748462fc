//! Pure numeric primitives shared by every indicator and tier.
//!
//! Rolling helpers return series aligned to the *end* of the input: the
//! last element always corresponds to the latest bar. Short inputs yield an
//! empty series or `None` instead of panicking.

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Simple moving average of the last `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    mean(&values[values.len() - period..])
}

/// Rolling mean over `window`; output length is `len - window + 1`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || values.len() < window {
        return Vec::new();
    }
    values
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

/// Sample standard deviation (n - 1 denominator) of the last `period` values.
pub fn standard_deviation(values: &[f64], period: usize) -> Option<f64> {
    if period < 2 || values.len() < period {
        return None;
    }
    sample_std(&values[values.len() - period..])
}

/// Rolling sample standard deviation over `window`.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    if window < 2 || values.len() < window {
        return Vec::new();
    }
    values.windows(window).filter_map(sample_std).collect()
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Exponential moving average series with `alpha = 2 / (period + 1)`,
/// seeded with the first value. Same length as the input.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if values.is_empty() || period == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev = values[0];
    result.push(prev);
    for &value in &values[1..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        result.push(prev);
    }
    result
}

/// Latest EMA value; requires at least `period` values.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    ema_series(values, period).last().copied()
}

/// True range of a bar given the previous close.
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Relative change from `from` to `to`; `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 || !from.is_finite() || !to.is_finite() {
        return None;
    }
    Some((to - from) / from)
}

/// Bar-over-bar relative returns.
pub fn returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|w| pct_change(w[0], w[1]))
        .collect()
}

/// Clamp into `[-1, 1]`; non-finite input maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

/// -1, 0 or 1 depending on the sign of `value`.
pub fn signum(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
