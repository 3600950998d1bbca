// =============================================================================
// Prediction Engine — target, stop loss and timeframe
// =============================================================================
//
// Targets and stops are placed on the regression-channel ladder:
//
//   Bullish  target = first resistance rung strictly above price
//                     (R1, R2, R3; Golden Cross starts at R2)
//            stop   = first support rung strictly below price - ATR/2
//   Bearish  target = first support rung strictly below price
//            stop   = first resistance rung strictly above price + ATR/2
//
// When price sits outside the three published bands the ladder keeps
// climbing in whole σ steps (R4 = center + 4σ, ...), so the target is always
// on the predicted side and the stop on the other.  A channel narrower than
// a millionth of price has no usable rungs; the step then falls back to
// max(ATR, 1% of price).
//
// Timeframe (trading days):
//
//   base   = target% / ATR%           (10 when ATR% is 0)
//   factor = 0.6 (ADX>=40) | 0.85 (>=25) | 1.2 (>=20) | 1.8
//   days   = clamp(round(base × factor), 2, 25)
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::error::{ScanError, ScanResult};
use crate::regression::RegressionChannel;
use crate::setup::SetupKind;
use crate::types::Direction;

pub const MIN_TIMEFRAME_DAYS: u32 = 2;
pub const MAX_TIMEFRAME_DAYS: u32 = 25;

const FLAT_VOLATILITY_BASE_DAYS: f64 = 10.0;
const STOP_ATR_FRACTION: f64 = 0.5;
const FALLBACK_STEP_PCT: f64 = 1.0;
const FLAT_CHANNEL_RATIO: f64 = 1e-6;

/// Rungs beyond R3 / S3 are searched for at most this many extra steps
/// before the fallback step is used.
const MAX_EXTRA_RUNGS: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub direction: Direction,
    pub target_price: f64,
    /// Distance to target in percent of price (always positive).
    pub target_pct: f64,
    pub stop_loss: f64,
    /// Distance to stop in percent of price (always positive).
    pub sl_pct: f64,
    pub timeframe_days: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct PredictionInputs<'a> {
    pub price: f64,
    pub direction: Direction,
    pub channel: &'a RegressionChannel,
    /// ATR as a percent of price.
    pub atr_pct: f64,
    pub adx: f64,
    pub setup: SetupKind,
}

/// Build the prediction for one candidate.
///
/// # Errors
/// `ScanError::InvalidPrice` when `price` is not a positive finite number.
pub fn predict(inputs: &PredictionInputs<'_>) -> ScanResult<Prediction> {
    let price = inputs.price;
    if !(price.is_finite() && price > 0.0) {
        return Err(ScanError::InvalidPrice(price));
    }

    let atr_pct = if inputs.atr_pct.is_finite() {
        inputs.atr_pct.max(0.0)
    } else {
        0.0
    };
    let atr_abs = price * atr_pct / 100.0;
    let step = atr_abs.max(price * FALLBACK_STEP_PCT / 100.0);
    let ch = inputs.channel;
    let sigma = if ch.std_dev > price * FLAT_CHANNEL_RATIO {
        ch.std_dev
    } else {
        0.0
    };

    // +1 walks the ladder upwards (resistances), -1 downwards (supports).
    let side = if inputs.direction.is_bullish() { 1.0 } else { -1.0 };
    let first_target_rung = match (inputs.direction, inputs.setup) {
        (Direction::Bullish, SetupKind::GoldenCross) => 2,
        _ => 1,
    };

    let target_price = rung_beyond(price, ch.center, sigma, side, first_target_rung)
        .unwrap_or(price + side * step);
    let stop_base =
        rung_beyond(price, ch.center, sigma, -side, 1).unwrap_or(price - side * step);
    let stop_loss = stop_base - side * STOP_ATR_FRACTION * atr_abs;

    let target_pct = (target_price - price).abs() / price * 100.0;
    let sl_pct = (stop_loss - price).abs() / price * 100.0;

    Ok(Prediction {
        direction: inputs.direction,
        target_price,
        target_pct,
        stop_loss,
        sl_pct,
        timeframe_days: timeframe_days(target_pct, atr_pct, inputs.adx),
    })
}

/// First ladder rung `center + side·k·σ` (k >= `min_k`) strictly beyond
/// `price` in the `side` direction.
///
/// Returns `None` for a flat or non-finite channel, or when no rung within
/// reach qualifies.
fn rung_beyond(price: f64, center: f64, sigma: f64, side: f64, min_k: u32) -> Option<f64> {
    let beyond = |level: f64| side * (level - price) > 0.0;

    if !(sigma.is_finite() && sigma > 0.0 && center.is_finite()) {
        return None;
    }

    let needed = (side * (price - center) / sigma).floor() + 1.0;
    let mut k = needed.max(f64::from(min_k));
    for _ in 0..MAX_EXTRA_RUNGS {
        let rung = center + side * k * sigma;
        if beyond(rung) {
            return Some(rung);
        }
        k += 1.0;
    }
    None
}

fn trend_factor(adx: f64) -> f64 {
    if adx >= 40.0 {
        0.6
    } else if adx >= 25.0 {
        0.85
    } else if adx >= 20.0 {
        1.2
    } else {
        1.8
    }
}

/// Expected trading days to reach the target, clamped to [2, 25].
pub fn timeframe_days(target_pct: f64, atr_pct: f64, adx: f64) -> u32 {
    let base = if atr_pct > 0.0 {
        target_pct / atr_pct
    } else {
        FLAT_VOLATILITY_BASE_DAYS
    };
    let days = (base * trend_factor(adx)).round();
    if !days.is_finite() {
        return MAX_TIMEFRAME_DAYS;
    }
    days.clamp(f64::from(MIN_TIMEFRAME_DAYS), f64::from(MAX_TIMEFRAME_DAYS)) as u32
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn channel(center: f64, sigma: f64) -> RegressionChannel {
        RegressionChannel {
            window: 60,
            center,
            slope: 0.1,
            std_dev: sigma,
            r1: center + sigma,
            r2: center + 2.0 * sigma,
            r3: center + 3.0 * sigma,
            s1: center - sigma,
            s2: center - 2.0 * sigma,
            s3: center - 3.0 * sigma,
        }
    }

    fn run(price: f64, direction: Direction, ch: &RegressionChannel, setup: SetupKind) -> Prediction {
        predict(&PredictionInputs {
            price,
            direction,
            channel: ch,
            atr_pct: 2.0,
            adx: 22.0,
            setup,
        })
        .unwrap()
    }

    fn assert_sides(p: &Prediction, price: f64) {
        if p.direction.is_bullish() {
            assert!(p.target_price > price, "target {} <= {}", p.target_price, price);
            assert!(p.stop_loss < price, "stop {} >= {}", p.stop_loss, price);
        } else {
            assert!(p.target_price < price, "target {} >= {}", p.target_price, price);
            assert!(p.stop_loss > price, "stop {} <= {}", p.stop_loss, price);
        }
    }

    // ---- ladder ----------------------------------------------------------

    #[test]
    fn bullish_targets_nearest_resistance() {
        let ch = channel(100.0, 2.0);
        let p = run(101.0, Direction::Bullish, &ch, SetupKind::Ema50Pullback);
        assert!((p.target_price - 102.0).abs() < 1e-9);
        // S1 98 minus half of ATR (2% of 101 = 2.02)
        assert!((p.stop_loss - 96.99).abs() < 1e-9);
        assert_sides(&p, 101.0);
    }

    #[test]
    fn bullish_skips_rungs_at_or_below_price() {
        let ch = channel(100.0, 2.0);
        let p = run(102.0, Direction::Bullish, &ch, SetupKind::NearEma50);
        assert!((p.target_price - 104.0).abs() < 1e-9);
    }

    #[test]
    fn golden_cross_starts_at_r2() {
        let ch = channel(100.0, 2.0);
        let p = run(100.5, Direction::Bullish, &ch, SetupKind::GoldenCross);
        assert!((p.target_price - 104.0).abs() < 1e-9);
    }

    #[test]
    fn bearish_targets_nearest_support() {
        let ch = channel(100.0, 2.0);
        let p = run(99.0, Direction::Bearish, &ch, SetupKind::NearEma200);
        assert!((p.target_price - 98.0).abs() < 1e-9);
        // R1 102 plus half of ATR (1.98)
        assert!((p.stop_loss - 102.99).abs() < 1e-9);
        assert_sides(&p, 99.0);
    }

    #[test]
    fn ladder_extends_past_r3() {
        let ch = channel(100.0, 2.0);
        let p = run(107.0, Direction::Bullish, &ch, SetupKind::Ema50Pullback);
        assert!((p.target_price - 108.0).abs() < 1e-9);
        assert_sides(&p, 107.0);
    }

    #[test]
    fn bullish_below_channel_keeps_stop_below_price() {
        let ch = channel(100.0, 2.0);
        // Price under S2: target stays R1, stop drops to S3 - ATR/2.
        let p = run(95.5, Direction::Bullish, &ch, SetupKind::ApproachingEma200);
        assert!((p.target_price - 102.0).abs() < 1e-9);
        assert!((p.stop_loss - (94.0 - 0.955)).abs() < 1e-9);
        assert_sides(&p, 95.5);
    }

    #[test]
    fn flat_channel_uses_fallback_step() {
        let ch = channel(100.0, 0.0);
        let p = run(100.0, Direction::Bullish, &ch, SetupKind::NearEma50);
        // step = max(ATR 2.0, 1% 1.0) = 2.0
        assert!((p.target_price - 102.0).abs() < 1e-9);
        assert!((p.stop_loss - 97.0).abs() < 1e-9);
        assert_sides(&p, 100.0);
    }

    #[test]
    fn sides_hold_across_prices() {
        let ch = channel(250.0, 3.5);
        for i in 0..200 {
            let price = 220.0 + i as f64 * 0.3;
            for dir in [Direction::Bullish, Direction::Bearish] {
                for setup in [SetupKind::GoldenCross, SetupKind::NearEma200] {
                    let p = run(price, dir, &ch, setup);
                    assert_sides(&p, price);
                    assert!(p.target_pct > 0.0 && p.sl_pct > 0.0);
                }
            }
        }
    }

    #[test]
    fn rejects_non_positive_price() {
        let ch = channel(100.0, 2.0);
        let err = predict(&PredictionInputs {
            price: 0.0,
            direction: Direction::Bullish,
            channel: &ch,
            atr_pct: 2.0,
            adx: 30.0,
            setup: SetupKind::NearEma50,
        })
        .unwrap_err();
        assert_eq!(err, ScanError::InvalidPrice(0.0));
    }

    // ---- timeframe -------------------------------------------------------

    #[test]
    fn zero_volatility_uses_base_ten() {
        assert_eq!(timeframe_days(5.0, 0.0, 10.0), 18);
        assert_eq!(timeframe_days(5.0, 0.0, 45.0), 6);
        assert_eq!(timeframe_days(5.0, 0.0, 22.0), 12);
    }

    #[test]
    fn timeframe_is_clamped() {
        assert_eq!(timeframe_days(0.5, 4.0, 50.0), MIN_TIMEFRAME_DAYS);
        assert_eq!(timeframe_days(40.0, 0.5, 5.0), MAX_TIMEFRAME_DAYS);
        assert_eq!(timeframe_days(f64::NAN, 2.0, 30.0), MAX_TIMEFRAME_DAYS);
    }

    #[test]
    fn timeframe_from_ratio() {
        // 6% target over 1% ATR with ADX 20 => 6 × 1.2 = 7.2 => 7
        assert_eq!(timeframe_days(6.0, 1.0, 20.0), 7);
    }
}
