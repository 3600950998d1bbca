// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the smoothed average of TR using Wilder's method:
//   ATR_0   = SMA of first `period` TR values
//   ATR_t   = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Default period: 14 (10 inside the Supertrend bands).
// =============================================================================

use crate::market_data::Bar;

use super::last_finite;

/// True range of each bar against its predecessor.
///
/// Index 0 has no previous close and is `NaN`.
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(bars.len());
    if bars.is_empty() {
        return tr;
    }
    tr.push(f64::NAN);
    for w in bars.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);
        let hl = cur.high - cur.low;
        let hc = (cur.high - prev.close).abs();
        let lc = (cur.low - prev.close).abs();
        tr.push(hl.max(hc).max(lc));
    }
    tr
}

/// Compute the ATR series aligned with `bars`.
///
/// The first value lands on bar index `period` (it needs `period` true ranges,
/// each of which needs a previous bar).  Earlier positions are `NaN`.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` bars => all-`NaN`
/// - a non-finite intermediate value truncates the series
pub fn atr_series(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let tr = true_range(bars);

    // --- Seed ATR with SMA of first `period` TR values -----------------------
    let seed: f64 = tr[1..=period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return out;
    }
    out[period] = seed;

    // --- Wilder's smoothing for remaining TR values --------------------------
    let period_f = period as f64;
    let mut atr = seed;
    for i in (period + 1)..n {
        atr = (atr * (period_f - 1.0) + tr[i]) / period_f;
        if !atr.is_finite() {
            break;
        }
        out[i] = atr;
    }

    out
}

/// Most recent ATR expressed as a percentage of the last close.
///
/// Useful for comparing volatility across instruments with different price
/// scales.  Returns `None` on insufficient history or a zero close.
pub fn calculate_atr_pct(bars: &[Bar], period: usize) -> Option<f64> {
    let atr = last_finite(&atr_series(bars, period))?;
    let last_close = bars.last()?.close;
    if last_close == 0.0 {
        return None;
    }
    Some((atr / last_close) * 100.0)
}
