// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use crate::market_data::Bar;

/// Compute the ADX series aligned with `bars`.
///
/// The first ADX value sits on bar index `2 * period - 1`; earlier positions
/// are `NaN`.
///
/// Returns an all-`NaN` series when:
/// - `period` is zero.
/// - There are fewer than `2 * period + 1` bars.
/// - Any intermediate calculation produces a non-finite result.
pub fn adx_series(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < 2 * period + 1 {
        return out;
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range per transition
    // ------------------------------------------------------------------
    let bar_count = n - 1;
    let mut plus_dm = Vec::with_capacity(bar_count);
    let mut minus_dm = Vec::with_capacity(bar_count);
    let mut tr_vals = Vec::with_capacity(bar_count);

    for w in bars.windows(2) {
        let (prev, cur) = (&w[0], &w[1]);

        let tr = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 { up_move } else { 0.0 });
        minus_dm.push(if down_move > up_move && down_move > 0.0 { down_move } else { 0.0 });
        tr_vals.push(tr);
    }

    // ------------------------------------------------------------------
    // Step 3–5: Wilder's smoothing and DX per transition
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

    // dx_values[k] belongs to bar index `period + k`.
    let mut dx_values: Vec<f64> = Vec::with_capacity(bar_count - period + 1);
    match compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr) {
        Some(dx) => dx_values.push(dx),
        None => return out,
    }

    for i in period..bar_count {
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];

        match compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr) {
            Some(dx) => dx_values.push(dx),
            None => return out,
        }
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    let adx_seed: f64 = dx_values[..period].iter().sum::<f64>() / period_f;
    if !adx_seed.is_finite() {
        return out;
    }

    let first = 2 * period - 1;
    out[first] = adx_seed;
    let mut adx = adx_seed;
    for (k, &dx) in dx_values[period..].iter().enumerate() {
        adx = (adx * (period_f - 1.0) + dx) / period_f;
        if !adx.is_finite() {
            break;
        }
        out[first + 1 + k] = adx;
    }

    out
}

/// Human-readable strength label for an ADX reading.
pub fn adx_label(value: f64) -> &'static str {
    if value >= 40.0 {
        "Very strong 💪"
    } else if value >= 25.0 {
        "Trending 📈"
    } else if value >= 20.0 {
        "Weak 〰️"
    } else {
        "Ranging 😴"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute DX from smoothed +DM, -DM, and TR values.
///
/// A zero true range or zero directional movement yields 0 (no trend).
/// Returns `None` only when the result is non-finite.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Option<f64> {
    if smooth_tr == 0.0 {
        return Some(0.0);
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return Some(0.0);
    }

    let dx = ((plus_di - minus_di).abs() / di_sum) * 100.0;
    if dx.is_finite() {
        Some(dx)
    } else {
        None
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::last_finite;
    use chrono::NaiveDate;

    fn bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(i as u64);
        Bar::new(date, close, high, low, close, 1.0)
    }

    #[test]
    fn adx_period_zero() {
        let bars: Vec<Bar> = (0..50).map(|i| bar(i, 2.0, 0.5, 1.5)).collect();
        assert!(adx_series(&bars, 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn adx_strong_uptrend() {
        let bars: Vec<Bar> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                bar(i, base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        let value = last_finite(&adx_series(&bars, 14)).unwrap();
        assert!(value > 25.0, "expected ADX > 25 for strong trend, got {value}");
    }

    #[test]
    fn adx_flat_market() {
        let bars: Vec<Bar> = (0..60).map(|i| bar(i, 101.0, 99.0, 100.0)).collect();
        let value = last_finite(&adx_series(&bars, 14)).unwrap();
        assert!(value < 1.0, "expected ADX near 0 for flat market, got {value}");
    }

    #[test]
    fn adx_zero_range_is_zero_not_missing() {
        let bars: Vec<Bar> = (0..40).map(|i| bar(i, 100.0, 100.0, 100.0)).collect();
        let value = last_finite(&adx_series(&bars, 14)).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<Bar> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                bar(i, base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        for &v in adx_series(&bars, 14).iter().filter(|v| v.is_finite()) {
            assert!((0.0..=100.0).contains(&v), "ADX {v} out of [0,100] range");
        }
    }

    #[test]
    fn adx_minimum_bars_exact() {
        let period = 5;
        let min = 2 * period + 1;
        let bars: Vec<Bar> = (0..min)
            .map(|i| {
                let base = 100.0 + i as f64;
                bar(i, base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        let series = adx_series(&bars, period);
        assert!(series[2 * period - 1].is_finite());
        assert!(series[..2 * period - 1].iter().all(|v| v.is_nan()));

        assert!(adx_series(&bars[..min - 1], period).iter().all(|v| v.is_nan()));
    }
}
