// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive closes.
// Step 2 — Seed average gain / average loss with the SMA of the first `period`
//          gains / losses.
// Step 3 — Apply Wilder's smoothing:
//            avg_gain = (prev_avg_gain * (period - 1) + current_gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + current_loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// A zero average loss has no defined RS; the oscillator reports mid-scale.
// =============================================================================

use super::pad_front;

/// Mid-scale value returned whenever RS is undefined.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Compute the RSI series for `closes` and `period`.
///
/// Output is aligned with `closes`: the first `period` positions are `NaN`
/// (they are consumed to seed the averages).
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => all-`NaN`
/// - average loss of zero => [`NEUTRAL_RSI`]
/// - a non-finite result truncates the series; the remainder is `NaN`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let n = closes.len();
    if period == 0 || n < period + 1 {
        return vec![f64::NAN; n];
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let (sum_gain, sum_loss) = deltas[..period].iter().fold((0.0_f64, 0.0_f64), |(g, l), &d| {
        if d > 0.0 {
            (g + d, l)
        } else {
            (g, l + d.abs())
        }
    });

    let period_f = period as f64;
    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut result = Vec::with_capacity(deltas.len() - period + 1);
    match rsi_from_averages(avg_gain, avg_loss) {
        Some(rsi) => result.push(rsi),
        None => return vec![f64::NAN; n],
    }

    for &delta in &deltas[period..] {
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { delta.abs() } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => result.push(rsi),
            None => break,
        }
    }

    let filled = period + result.len();
    let mut out = pad_front(result, filled);
    out.resize(n, f64::NAN);
    out
}

/// Human-readable zone for an RSI reading.
pub fn rsi_label(value: f64) -> &'static str {
    if value >= 70.0 {
        "Overbought ⚠️"
    } else if value >= 55.0 {
        "Bullish 🟢"
    } else if value >= 45.0 {
        "Neutral ⚖️"
    } else if value >= 30.0 {
        "Bearish 🔴"
    } else {
        "Oversold 💡"
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` when the result is non-finite.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    let rsi = if avg_loss == 0.0 {
        NEUTRAL_RSI
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if rsi.is_finite() {
        Some(rsi)
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

    #[test]
    fn rsi_empty_input() {
        assert!(calculate_rsi(&[], 14).is_empty());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period+1 closes. 14 closes => 13 deltas < 14.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        let out = calculate_rsi(&closes, 14);
        assert_eq!(out.len(), 14);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_alignment() {
        let closes: Vec<f64> = (0..30).map(|x| 100.0 + (x as f64 * 0.7).sin()).collect();
        let out = calculate_rsi(&closes, 14);
        assert_eq!(out.len(), 30);
        assert!(out[..14].iter().all(|v| v.is_nan()));
        assert!(out[14..].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rsi_all_losses() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let out = calculate_rsi(&closes, 14);
        for &v in &out[14..] {
            assert!(v.abs() < 1e-10, "expected 0.0, got {v}");
        }
    }

    #[test]
    fn rsi_zero_loss_is_neutral() {
        // Strictly ascending or flat prices never record a loss.
        let rising: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let flat = vec![100.0; 30];
        for closes in [rising, flat] {
            let out = calculate_rsi(&closes, 14);
            for &v in &out[14..] {
                assert!((v - NEUTRAL_RSI).abs() < 1e-10, "expected 50.0, got {v}");
            }
        }
    }

    #[test]
    fn rsi_range_check() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08,
            45.89, 46.03, 44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let out = calculate_rsi(&closes, 14);
        for &v in out.iter().filter(|v| v.is_finite()) {
            assert!((0.0..=100.0).contains(&v), "RSI {v} out of range");
        }
    }

    #[test]
    fn rsi_mostly_rising_is_above_midscale() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + i as f64 - if i % 5 == 0 { 1.5 } else { 0.0 })
            .collect();
        let out = calculate_rsi(&closes, 14);
        assert!(out[39] > 50.0);
    }

    #[test]
    fn labels() {
        assert_eq!(rsi_label(75.0), "Overbought ⚠️");
        assert_eq!(rsi_label(50.0), "Neutral ⚖️");
        assert_eq!(rsi_label(10.0), "Oversold 💡");
    }
}
