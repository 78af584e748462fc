//! Volume profile: point of control and value area

use crate::models::candle::Candle;
use crate::models::indicators::VolumeProfileIndicator;

/// Buckets each bar's volume at its typical price into `bins` equal-width
/// price bins spanning the slice's low..high range.
///
/// The point of control is the centre of the heaviest bin. The value area
/// grows outward from it, always taking the heavier neighbour, until it holds
/// `value_area_pct` of total volume.
pub fn calculate_volume_profile(
    candles: &[Candle],
    bins: usize,
    value_area_pct: f64,
) -> Option<VolumeProfileIndicator> {
    if candles.is_empty() || bins == 0 {
        return None;
    }

    let low = candles.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let high = candles.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let total_volume: f64 = candles.iter().map(|c| c.volume).sum();
    if high <= low || total_volume <= 0.0 {
        return None;
    }

    let bin_width = (high - low) / bins as f64;
    let mut histogram = vec![0.0; bins];
    for candle in candles {
        let idx = (((candle.typical_price() - low) / bin_width) as usize).min(bins - 1);
        histogram[idx] += candle.volume;
    }

    let mut poc_idx = 0;
    for (i, volume) in histogram.iter().enumerate() {
        if *volume > histogram[poc_idx] {
            poc_idx = i;
        }
    }

    let target = total_volume * value_area_pct.clamp(0.0, 1.0);
    let (mut lo, mut hi) = (poc_idx, poc_idx);
    let mut covered = histogram[poc_idx];
    while covered < target && (lo > 0 || hi < bins - 1) {
        let below = if lo > 0 { histogram[lo - 1] } else { f64::MIN };
        let above = if hi < bins - 1 { histogram[hi + 1] } else { f64::MIN };
        if above >= below {
            hi += 1;
            covered += histogram[hi];
        } else {
            lo -= 1;
            covered += histogram[lo];
        }
    }

    Some(VolumeProfileIndicator {
        point_of_control: low + bin_width * (poc_idx as f64 + 0.5),
        value_area_high: low + bin_width * (hi as f64 + 1.0),
        value_area_low: low + bin_width * lo as f64,
    })
}
