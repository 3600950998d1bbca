// =============================================================================
// MACD Histogram
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - Signal line
//
// The scanner consumes only the histogram: its sign votes on direction and
// its bar-over-bar change flags momentum turning up.
// =============================================================================

use super::ema::calculate_ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// Compute the MACD histogram aligned with `closes`.
///
/// The first finite value appears at index `slow + signal - 2`.
pub fn macd_histogram(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Vec<f64> {
    let fast_ema = calculate_ema(closes, fast);
    let slow_ema = calculate_ema(closes, slow);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd_line, signal);

    macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect()
}

/// Histogram with the conventional 12 / 26 / 9 periods.
pub fn default_histogram(closes: &[f64]) -> Vec<f64> {
    macd_histogram(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
