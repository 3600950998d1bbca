// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Two flavours are provided:
//
// * `ewm_mean` — adjusted exponential weighting from the very first bar.
//   Every output is the weighted mean of all closes seen so far with weights
//   (1 - α)^k, α = 2 / (span + 1).  Defined from bar 0, so short histories
//   simply reflect partial information.  This drives the EMA50 / EMA200 trend
//   filters.
//
// * `calculate_ema` — the classic recursive EMA seeded with the SMA of the
//   first `period` values:
//     multiplier = 2 / (period + 1)
//     EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//   Used inside MACD where the warm-up convention matters.
// =============================================================================

/// Adjusted exponentially weighted mean with the given `span`.
///
/// Output has the same length as `values`.  A `span` of zero yields an
/// all-`NaN` series.  Non-finite inputs are skipped: the previous mean is
/// carried forward for that position.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut result = Vec::with_capacity(values.len());

    for &v in values {
        if v.is_finite() {
            numerator = v + decay * numerator;
            denominator = 1.0 + decay * denominator;
        }
        if denominator > 0.0 {
            result.push(numerator / denominator);
        } else {
            result.push(f64::NAN);
        }
    }

    result
}

/// Compute the SMA-seeded EMA series for `values` and look-back `period`.
///
/// The output is aligned with the input; the first `period - 1` positions are
/// `NaN`.  Leading `NaN` inputs (e.g. an upstream warm-up) are skipped before
/// seeding.
///
/// # Edge cases
/// - `period == 0` => all-`NaN`
/// - fewer than `period` finite values => all-`NaN`
/// - a non-finite value after seeding stops the series; the remainder is `NaN`
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    if period == 0 {
        return vec![f64::NAN; n];
    }

    let start = match values.iter().position(|v| v.is_finite()) {
        Some(idx) => idx,
        None => return vec![f64::NAN; n],
    };
    let tail = &values[start..];
    if tail.len() < period {
        return vec![f64::NAN; n];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Seed: SMA of the first `period` values.
    let sma: f64 = tail[..period].iter().sum::<f64>() / period as f64;
    if !sma.is_finite() {
        return vec![f64::NAN; n];
    }

    let mut result = Vec::with_capacity(n);
    result.push(sma);

    let mut prev_ema = sma;
    for &value in &tail[period..] {
        let ema = value * multiplier + prev_ema * (1.0 - multiplier);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    // Seed sits at input index `start + period - 1`; a truncated series is
    // NaN-filled at the back.
    let mut out = vec![f64::NAN; start + period - 1];
    out.extend(result);
    out.resize(n, f64::NAN);
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- ewm_mean --------------------------------------------------------

    #[test]
    fn ewm_first_value_is_first_input() {
        let out = ewm_mean(&[10.0, 20.0, 30.0], 50);
        assert_eq!(out.len(), 3);
        assert!((out[0] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn ewm_matches_adjusted_weights() {
        // span 3 => alpha 0.5, decay 0.5
        // t=1: (2 + 0.5*1) / (1 + 0.5)       = 1.6667
        // t=2: (3 + 0.5*2 + 0.25*1) / 1.75   = 2.4286
        let out = ewm_mean(&[1.0, 2.0, 3.0], 3);
        assert!((out[1] - 2.5 / 1.5).abs() < 1e-12);
        assert!((out[2] - 4.25 / 1.75).abs() < 1e-12);
    }

    #[test]
    fn ewm_flat_series_is_flat() {
        let out = ewm_mean(&[100.0; 40], 200);
        assert!(out.iter().all(|v| (v - 100.0).abs() < 1e-9));
    }

    #[test]
    fn ewm_short_span_tracks_faster() {
        let closes: Vec<f64> = (1..=300).map(|x| x as f64).collect();
        let fast = ewm_mean(&closes, 50);
        let slow = ewm_mean(&closes, 200);
        let last = closes.len() - 1;
        assert!(fast[last] > slow[last]);
        assert!(fast[last] < closes[last]);
    }

    #[test]
    fn ewm_span_zero_is_nan() {
        assert!(ewm_mean(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_insufficient_data_is_all_nan() {
        let out = calculate_ema(&[1.0, 2.0], 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ema_period_equals_length() {
        let out = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert!(out[0].is_nan() && out[1].is_nan());
        assert!((out[2] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of 1..=10: SMA seed 3.0 at index 4, multiplier 1/3.
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&closes, 5);
        assert_eq!(ema.len(), 10);
        assert!(ema[..4].iter().all(|v| v.is_nan()));

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[4] - expected).abs() < 1e-10);
        for i in 5..10 {
            expected = closes[i] * mult + expected * (1.0 - mult);
            assert!((ema[i] - expected).abs() < 1e-10, "index {i}");
        }
    }

    #[test]
    fn ema_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 2.0, 4.0, 6.0, 8.0];
        let ema = calculate_ema(&values, 3);
        assert_eq!(ema.len(), 6);
        assert!(ema[..4].iter().all(|v| v.is_nan()));
        assert!((ema[4] - 4.0).abs() < 1e-10);
        assert!((ema[5] - (8.0 * 0.5 + 4.0 * 0.5)).abs() < 1e-10);
    }

    #[test]
    fn ema_handles_nan_after_seed() {
        let ema = calculate_ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 3);
        assert_eq!(ema.len(), 5);
        assert!((ema[2] - 2.0).abs() < 1e-10);
        assert!(ema[3].is_nan() && ema[4].is_nan());
    }
}
