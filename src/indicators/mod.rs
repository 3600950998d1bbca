// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the setup
// scanner.  Series functions return a `Vec<f64>` aligned one-to-one with their
// input; positions without enough history hold `NaN`.  Degenerate arithmetic
// (zero volume, zero losses, zero range) resolves to a neutral value instead
// of propagating a division fault.

pub mod adx;
pub mod atr;
pub mod ema;
pub mod fibonacci;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod supertrend;
pub mod volume;
pub mod vwap;

/// Most recent finite value of a series.
pub fn last_finite(series: &[f64]) -> Option<f64> {
    series.iter().rev().copied().find(|v| v.is_finite())
}

/// Left-pad `values` with `NaN` so that it is `len` long.
///
/// Used to align warm-up-trimmed outputs with their input series.
pub(crate) fn pad_front(values: Vec<f64>, len: usize) -> Vec<f64> {
    if values.len() >= len {
        return values;
    }
    let mut out = vec![f64::NAN; len - values.len()];
    out.extend(values);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_finite_skips_trailing_nan() {
        assert_eq!(last_finite(&[1.0, 2.0, f64::NAN]), Some(2.0));
        assert_eq!(last_finite(&[f64::NAN]), None);
        assert_eq!(last_finite(&[]), None);
    }

    #[test]
    fn pad_front_aligns_length() {
        let padded = pad_front(vec![1.0, 2.0], 4);
        assert_eq!(padded.len(), 4);
        assert!(padded[0].is_nan() && padded[1].is_nan());
        assert_eq!(&padded[2..], &[1.0, 2.0]);
    }
}
