// =============================================================================
// Setup Classifier — EMA-structure pattern detection
// =============================================================================
//
// Rules are evaluated strictly in priority order and the first match wins:
//
//   1. Golden Cross        EMA50 crossed above EMA200 within the last
//                          5 bar-to-bar transitions.
//   2. Approaching EMA200  price 0–3% below EMA200 with the MACD histogram
//                          rising versus the prior bar.
//   3. EMA50 Pullback      price above EMA200, within -2% / +1.5% of EMA50,
//                          RSI above 40.
//   4. Proximity fallback  |dist EMA200| < 3% or else |dist EMA50| < 3%.
//
// No match means the instrument is excluded from ranking for this scan.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Number of trailing transitions inspected for a golden cross.
pub const GOLDEN_CROSS_LOOKBACK: usize = 5;

const APPROACH_MAX_BELOW_PCT: f64 = 3.0;
const PULLBACK_LOWER_PCT: f64 = -2.0;
const PULLBACK_UPPER_PCT: f64 = 1.5;
const PULLBACK_MIN_RSI: f64 = 40.0;
const PROXIMITY_PCT: f64 = 3.0;

/// Named setup category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetupKind {
    GoldenCross,
    ApproachingEma200,
    Ema50Pullback,
    NearEma200,
    NearEma50,
}

impl SetupKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::GoldenCross => "🌟",
            Self::ApproachingEma200 => "🔼",
            Self::Ema50Pullback => "📉➡📈",
            Self::NearEma200 | Self::NearEma50 => "📍",
        }
    }
}

impl std::fmt::Display for SetupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoldenCross => write!(f, "Golden Cross"),
            Self::ApproachingEma200 => write!(f, "Approaching EMA200"),
            Self::Ema50Pullback => write!(f, "EMA50 Pullback"),
            Self::NearEma200 => write!(f, "Near EMA200"),
            Self::NearEma50 => write!(f, "Near EMA50"),
        }
    }
}

/// A classified setup with its human-readable description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    pub kind: SetupKind,
    pub description: String,
}

/// Inputs to the classifier, all aligned on the same bars.
#[derive(Debug, Clone, Copy)]
pub struct SetupInputs<'a> {
    pub closes: &'a [f64],
    pub ema50: &'a [f64],
    pub ema200: &'a [f64],
    pub macd_hist: &'a [f64],
    pub rsi: &'a [f64],
}

/// Percentage distance of `price` from `reference` (negative = below).
pub fn distance_pct(price: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (price - reference) / reference * 100.0
}

/// Classify the latest bar.  Returns `None` when no rule matches.
pub fn classify(inputs: &SetupInputs<'_>) -> Option<Setup> {
    let last = *inputs.closes.last()?;
    let e50 = *inputs.ema50.last()?;
    let e200 = *inputs.ema200.last()?;
    let rsi = inputs.rsi.last().copied().unwrap_or(f64::NAN);

    let dist_200 = distance_pct(last, e200);
    let dist_50 = distance_pct(last, e50);

    if golden_cross_within(inputs.ema50, inputs.ema200, GOLDEN_CROSS_LOOKBACK) {
        return Some(Setup {
            kind: SetupKind::GoldenCross,
            description: "EMA50 just crossed above EMA200, strong long-term bullish signal"
                .to_string(),
        });
    }

    if (-APPROACH_MAX_BELOW_PCT..=0.0).contains(&dist_200) && macd_turning_up(inputs.macd_hist) {
        return Some(Setup {
            kind: SetupKind::ApproachingEma200,
            description: format!(
                "Price is {:.1}% below EMA200 and pushing up, breakout watch",
                dist_200.abs()
            ),
        });
    }

    let in_pullback_zone = (PULLBACK_LOWER_PCT..=PULLBACK_UPPER_PCT).contains(&dist_50);
    if last > e200 && in_pullback_zone && rsi > PULLBACK_MIN_RSI {
        return Some(Setup {
            kind: SetupKind::Ema50Pullback,
            description: format!(
                "Uptrend intact (above EMA200), price {:+.1}% from EMA50, buy-the-dip zone",
                dist_50
            ),
        });
    }

    if dist_200.abs() < PROXIMITY_PCT {
        return Some(Setup {
            kind: SetupKind::NearEma200,
            description: format!("Price within {:.1}% of EMA200", dist_200.abs()),
        });
    }

    if dist_50.abs() < PROXIMITY_PCT {
        return Some(Setup {
            kind: SetupKind::NearEma50,
            description: format!("Price within {:.1}% of EMA50", dist_50.abs()),
        });
    }

    None
}

/// `true` if any of the last `lookback` transitions has `fast` moving from at
/// or below `slow` to strictly above it.
pub fn golden_cross_within(fast: &[f64], slow: &[f64], lookback: usize) -> bool {
    let n = fast.len().min(slow.len());
    if n < 2 {
        return false;
    }
    let transitions = lookback.min(n - 1);
    (1..=transitions).any(|j| {
        let cur = n - j;
        let prev = cur - 1;
        fast[prev] <= slow[prev] && fast[cur] > slow[cur]
    })
}

fn macd_turning_up(hist: &[f64]) -> bool {
    match hist {
        [.., prev, now] => now > prev,
        _ => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// EMA pair with EMA50 crossing above EMA200 `bars_ago` bars before the
    /// end of a 30-bar series.
    fn crossing(bars_ago: usize) -> (Vec<f64>, Vec<f64>) {
        let n = 30;
        let cross_at = n - 1 - bars_ago;
        let slow = vec![100.0; n];
        let fast = (0..n)
            .map(|i| if i < cross_at { 99.0 } else { 101.0 })
            .collect();
        (fast, slow)
    }

    fn inputs<'a>(
        closes: &'a [f64],
        ema50: &'a [f64],
        ema200: &'a [f64],
        macd: &'a [f64],
        rsi: &'a [f64],
    ) -> SetupInputs<'a> {
        SetupInputs {
            closes,
            ema50,
            ema200,
            macd_hist: macd,
            rsi,
        }
    }

    // ---- golden cross ----------------------------------------------------

    #[test]
    fn golden_cross_two_bars_ago() {
        let (fast, slow) = crossing(2);
        let closes = vec![101.0; 30];
        let macd = vec![0.0; 30];
        let rsi = vec![55.0; 30];
        let setup = classify(&inputs(&closes, &fast, &slow, &macd, &rsi)).unwrap();
        assert_eq!(setup.kind, SetupKind::GoldenCross);
    }

    #[test]
    fn golden_cross_boundary() {
        let (fast, slow) = crossing(4);
        assert!(golden_cross_within(&fast, &slow, 5));
        let (fast, slow) = crossing(5);
        assert!(!golden_cross_within(&fast, &slow, 5));
    }

    #[test]
    fn golden_cross_six_bars_ago_is_outside_window() {
        let (fast, slow) = crossing(6);
        assert!(!golden_cross_within(&fast, &slow, GOLDEN_CROSS_LOOKBACK));

        let closes = vec![101.0; 30];
        let macd = vec![0.0; 30];
        let rsi = vec![55.0; 30];
        let setup = classify(&inputs(&closes, &fast, &slow, &macd, &rsi)).unwrap();
        assert_ne!(setup.kind, SetupKind::GoldenCross);
    }

    #[test]
    fn touching_from_equal_counts_as_cross() {
        let fast = vec![100.0, 100.0, 100.5];
        let slow = vec![100.0, 100.0, 100.0];
        assert!(golden_cross_within(&fast, &slow, 5));
    }

    // ---- approaching ema200 ----------------------------------------------

    #[test]
    fn approaching_requires_rising_macd() {
        let closes = [98.0];
        let e50 = [90.0];
        let e200 = [100.0];
        let rsi = [50.0];

        let setup = classify(&inputs(&closes, &e50, &e200, &[-0.5, -0.2], &rsi)).unwrap();
        assert_eq!(setup.kind, SetupKind::ApproachingEma200);
        assert!(setup.description.contains("2.0%"));

        // Falling histogram drops to the proximity fallback.
        let setup = classify(&inputs(&closes, &e50, &e200, &[-0.2, -0.5], &rsi)).unwrap();
        assert_eq!(setup.kind, SetupKind::NearEma200);
    }

    #[test]
    fn approaching_includes_zero_distance() {
        let setup = classify(&inputs(&[100.0], &[90.0], &[100.0], &[0.0, 1.0], &[50.0])).unwrap();
        assert_eq!(setup.kind, SetupKind::ApproachingEma200);
    }

    // ---- pullback --------------------------------------------------------

    #[test]
    fn pullback_in_uptrend() {
        let setup = classify(&inputs(&[101.0], &[100.0], &[90.0], &[0.0, -1.0], &[45.0])).unwrap();
        assert_eq!(setup.kind, SetupKind::Ema50Pullback);
    }

    #[test]
    fn pullback_needs_rsi_above_40() {
        // Price 11% above EMA200 and 1% above EMA50; RSI 35 fails the
        // pullback rule, proximity to EMA50 catches it.
        let setup = classify(&inputs(&[101.0], &[100.0], &[91.0], &[0.0, -1.0], &[35.0])).unwrap();
        assert_eq!(setup.kind, SetupKind::NearEma50);
    }

    #[test]
    fn pullback_bounds() {
        let rsi = [50.0];
        let macd = [0.0, -1.0];
        // +1.6% above EMA50 misses the pullback window and EMA50 proximity
        // then matches.
        let setup = classify(&inputs(&[101.6], &[100.0], &[80.0], &macd, &rsi)).unwrap();
        assert_eq!(setup.kind, SetupKind::NearEma50);
        // -1.5% is inside.
        let setup = classify(&inputs(&[98.5], &[100.0], &[80.0], &macd, &rsi)).unwrap();
        assert_eq!(setup.kind, SetupKind::Ema50Pullback);
    }

    // ---- fallback / none -------------------------------------------------

    #[test]
    fn fallback_prefers_ema200() {
        // 2% above both EMAs: too far above EMA50 for a pullback, so the
        // EMA200 proximity check runs first.
        let setup = classify(&inputs(&[102.0], &[100.0], &[100.0], &[0.0, -1.0], &[20.0])).unwrap();
        assert_eq!(setup.kind, SetupKind::NearEma200);
    }

    #[test]
    fn no_setup_far_from_both() {
        let out = classify(&inputs(&[150.0], &[120.0], &[100.0], &[0.0, 1.0], &[60.0]));
        assert!(out.is_none());
    }

    #[test]
    fn priority_golden_cross_beats_everything() {
        // Inputs also satisfy Approaching EMA200 (price 1% below, MACD up).
        let fast = vec![99.0, 99.5, 101.0];
        let slow = vec![100.0, 100.0, 100.0];
        let closes = vec![99.0, 99.0, 99.0];
        let setup = classify(&inputs(&closes, &fast, &slow, &[0.0, 0.0, 1.0], &[50.0])).unwrap();
        assert_eq!(setup.kind, SetupKind::GoldenCross);
    }

    #[test]
    fn empty_inputs_are_none() {
        assert!(classify(&inputs(&[], &[], &[], &[], &[])).is_none());
    }
}
