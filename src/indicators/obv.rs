// =============================================================================
// On-Balance Volume (OBV) slope
// =============================================================================
//
//   OBV_0 = 0
//   OBV_t = OBV_{t-1} + sign(close_t - close_{t-1}) * volume_t
//
// Accumulation is judged from the least-squares slope of OBV over the
// trailing look-back rather than from its level.
// =============================================================================

use crate::market_data::Bar;
use crate::regression::least_squares;

pub const DEFAULT_LOOKBACK: usize = 20;

/// Cumulative signed volume aligned with `bars`.
pub fn obv_series(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut obv = 0.0;
    for (i, bar) in bars.iter().enumerate() {
        if i > 0 {
            let change = bar.close - bars[i - 1].close;
            if change > 0.0 {
                obv += bar.volume;
            } else if change < 0.0 {
                obv -= bar.volume;
            }
        }
        out.push(obv);
    }
    out
}

/// Slope of OBV over the trailing `lookback` bars (or all bars when fewer).
///
/// Returns `None` when fewer than two points are available.
pub fn obv_slope(bars: &[Bar], lookback: usize) -> Option<f64> {
    let obv = obv_series(bars);
    let start = obv.len().saturating_sub(lookback);
    least_squares(&obv[start..]).map(|fit| fit.slope)
}

/// `true` when OBV is trending up over the look-back.
pub fn obv_rising(bars: &[Bar], lookback: usize) -> bool {
    obv_slope(bars, lookback).is_some_and(|slope| slope > 0.0)
}
