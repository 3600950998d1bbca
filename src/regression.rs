// =============================================================================
// Linear Regression Channel — support / resistance ladder
// =============================================================================
//
// A first-degree least-squares line is fitted to the trailing W closes with
// x = 0..W-1.  The residual standard deviation (population: divide by W)
// spaces three bands on either side of the fitted value at the latest bar:
//
//   R3 = center + 3σ        S1 = center - 1σ
//   R2 = center + 2σ        S2 = center - 2σ
//   R1 = center + 1σ        S3 = center - 3σ
//
// The ladder feeds both the trend vote (slope sign) and the prediction
// engine's target / stop placement.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::types::Trend;

/// Default trailing window, in bars.
pub const DEFAULT_WINDOW: usize = 60;

/// Slope / intercept of a least-squares line through `(i, ys[i])`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn value_at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least-squares fit of `ys` against their indices.
///
/// Returns `None` for fewer than two points or non-finite input.
pub fn least_squares(ys: &[f64]) -> Option<LineFit> {
    let n = ys.len();
    if n < 2 || ys.iter().any(|y| !y.is_finite()) {
        return None;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = ys.iter().sum::<f64>() / n_f;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, &y) in ys.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

/// Regression channel evaluated at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionChannel {
    /// Number of bars actually fitted.
    pub window: usize,
    /// Fitted value at the latest bar.
    pub center: f64,
    pub slope: f64,
    /// Population standard deviation of the residuals.
    pub std_dev: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl RegressionChannel {
    /// Fit the channel to the trailing `window` closes.  The window shrinks
    /// to the available history when shorter.
    pub fn fit(closes: &[f64], window: usize) -> Option<Self> {
        let w = window.min(closes.len());
        let ys = &closes[closes.len() - w..];
        let line = least_squares(ys)?;

        let w_f = w as f64;
        let variance = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let r = y - line.value_at(i as f64);
                r * r
            })
            .sum::<f64>()
            / w_f;
        let std_dev = variance.sqrt();
        let center = line.value_at(w_f - 1.0);

        Some(Self {
            window: w,
            center,
            slope: line.slope,
            std_dev,
            r1: center + std_dev,
            r2: center + 2.0 * std_dev,
            r3: center + 3.0 * std_dev,
            s1: center - std_dev,
            s2: center - 2.0 * std_dev,
            s3: center - 3.0 * std_dev,
        })
    }

    pub fn trend(&self) -> Trend {
        if self.slope > 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_line_has_zero_spread() {
        let closes: Vec<f64> = (0..60).map(|i| 10.0 + 2.0 * i as f64).collect();
        let ch = RegressionChannel::fit(&closes, 60).unwrap();
        assert!((ch.slope - 2.0).abs() < 1e-9);
        assert!((ch.center - closes[59]).abs() < 1e-9);
        assert!(ch.std_dev.abs() < 1e-9);
        assert_eq!(ch.trend(), Trend::Up);
    }

    #[test]
    fn population_std_dev() {
        // Residuals of [0, 2, 0, 2] about slope-0.4 line:
        // fit: mean x 1.5, mean y 1; sxy = (-1.5)(-1)+(-0.5)(1)+(0.5)(-1)+(1.5)(1) = 2
        // sxx = 5 => slope 0.4, intercept 0.4
        // fitted: 0.4, 0.8, 1.2, 1.6; residuals -0.4, 1.2, -1.2, 0.4
        // population variance = (0.16 + 1.44 + 1.44 + 0.16) / 4 = 0.8
        let ch = RegressionChannel::fit(&[0.0, 2.0, 0.0, 2.0], 4).unwrap();
        assert!((ch.slope - 0.4).abs() < 1e-12);
        assert!((ch.std_dev - 0.8_f64.sqrt()).abs() < 1e-12);
        assert!((ch.center - 1.6).abs() < 1e-12);
    }

    #[test]
    fn ladder_is_ordered() {
        let closes: Vec<f64> = (0..80)
            .map(|i| 100.0 - 0.3 * i as f64 + (i as f64 * 1.3).sin() * 2.0)
            .collect();
        let ch = RegressionChannel::fit(&closes, 60).unwrap();
        assert!(ch.s3 < ch.s2 && ch.s2 < ch.s1 && ch.s1 < ch.center);
        assert!(ch.center < ch.r1 && ch.r1 < ch.r2 && ch.r2 < ch.r3);
        assert_eq!(ch.trend(), Trend::Down);
        assert_eq!(ch.window, 60);
    }

    #[test]
    fn window_shrinks_to_history() {
        let ch = RegressionChannel::fit(&[1.0, 2.0, 3.0], 60).unwrap();
        assert_eq!(ch.window, 3);
    }

    #[test]
    fn too_short_is_none() {
        assert!(RegressionChannel::fit(&[1.0], 60).is_none());
        assert!(RegressionChannel::fit(&[], 60).is_none());
    }

    #[test]
    fn flat_slope_is_down() {
        let ch = RegressionChannel::fit(&[5.0; 10], 10).unwrap();
        assert_eq!(ch.trend(), Trend::Down);
    }
}
