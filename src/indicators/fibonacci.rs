// =============================================================================
// Fibonacci retracement proximity
// =============================================================================
//
// Retracement levels are measured up from the lowest low of the supplied
// history:  level = low + ratio × (high - low).
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::market_data::Bar;

/// Proximity tolerance, in percent of the level.
pub const PROXIMITY_PCT: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FibLevel {
    Golden618,
    Half,
}

impl FibLevel {
    pub fn ratio(self) -> f64 {
        match self {
            Self::Golden618 => 0.618,
            Self::Half => 0.5,
        }
    }
}

impl std::fmt::Display for FibLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Golden618 => write!(f, "Near Fib 61.8% 🔑"),
            Self::Half => write!(f, "Near Fib 50% 🔑"),
        }
    }
}

/// The retracement level the last close sits on, if any.  61.8% wins over 50%
/// when both are within tolerance.
pub fn nearest_fib_level(bars: &[Bar]) -> Option<FibLevel> {
    let last = bars.last()?.close;
    let high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    if !high.is_finite() || !low.is_finite() {
        return None;
    }

    [FibLevel::Golden618, FibLevel::Half].into_iter().find(|level| {
        let price = low + level.ratio() * (high - low);
        price != 0.0 && ((last - price).abs() / price * 100.0) <= PROXIMITY_PCT
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap() + chrono::Days::new(i as u64);
        Bar::new(date, close, high, low, close, 1.0)
    }

    #[test]
    fn detects_golden_ratio() {
        // range 100..200 => 61.8% level at 161.8
        let bars = vec![bar(0, 200.0, 100.0, 150.0), bar(1, 163.0, 160.0, 162.0)];
        assert_eq!(nearest_fib_level(&bars), Some(FibLevel::Golden618));
    }

    #[test]
    fn detects_half() {
        let bars = vec![bar(0, 200.0, 100.0, 150.0), bar(1, 152.0, 149.0, 151.0)];
        assert_eq!(nearest_fib_level(&bars), Some(FibLevel::Half));
    }

    #[test]
    fn none_when_far_from_levels() {
        let bars = vec![bar(0, 200.0, 100.0, 150.0), bar(1, 196.0, 190.0, 195.0)];
        assert_eq!(nearest_fib_level(&bars), None);
        assert_eq!(nearest_fib_level(&[]), None);
    }
}
