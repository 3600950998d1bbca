// =============================================================================
// Supertrend — band-following trend flip
// =============================================================================
//
//   upper_raw = hl2 + multiplier * ATR
//   lower_raw = hl2 - multiplier * ATR
//
// The active bands ratchet: a new lower band only replaces the previous active
// lower band when it is higher, or when the previous close had already broken
// below the previous trend line (symmetric for the upper band).  Direction
// flips down when a close falls under the active lower band while up, and
// flips up when a close rises above the active upper band while down.
//
// Every bar depends on the previous bar's active bands, trend line and
// direction, so the computation is a strict left-to-right fold.
// =============================================================================

use crate::market_data::Bar;

use super::atr::atr_series;

pub const DEFAULT_PERIOD: usize = 10;
pub const DEFAULT_MULTIPLIER: f64 = 3.0;

/// Trend direction emitted per bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    /// +1 for up, -1 for down.
    pub fn as_sign(self) -> i8 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// State carried from one bar to the next.
#[derive(Debug, Clone, Copy)]
struct FoldState {
    lower: f64,
    upper: f64,
    trend_line: f64,
    direction: TrendDirection,
    prev_close: f64,
}

/// Per-bar Supertrend output.
#[derive(Debug, Clone)]
pub struct SupertrendOutput {
    /// Active trend line; `NaN` until ATR is defined.
    pub trend_line: Vec<f64>,
    /// Active lower band; `NaN` until ATR is defined.
    pub lower: Vec<f64>,
    /// Active upper band; `NaN` until ATR is defined.
    pub upper: Vec<f64>,
    /// Direction per bar (`Up` during warm-up).
    pub direction: Vec<TrendDirection>,
}

impl SupertrendOutput {
    /// Direction at the latest bar as +1 / -1.
    pub fn last_sign(&self) -> i8 {
        self.direction
            .last()
            .copied()
            .unwrap_or(TrendDirection::Up)
            .as_sign()
    }
}

/// Run the Supertrend fold over `bars`.
pub fn supertrend(bars: &[Bar], period: usize, multiplier: f64) -> SupertrendOutput {
    let n = bars.len();
    let atr = atr_series(bars, period);

    let mut out = SupertrendOutput {
        trend_line: Vec::with_capacity(n),
        lower: Vec::with_capacity(n),
        upper: Vec::with_capacity(n),
        direction: Vec::with_capacity(n),
    };

    let mut state: Option<FoldState> = None;

    for (bar, &atr_i) in bars.iter().zip(atr.iter()) {
        if !atr_i.is_finite() {
            out.trend_line.push(f64::NAN);
            out.lower.push(f64::NAN);
            out.upper.push(f64::NAN);
            out.direction.push(TrendDirection::Up);
            continue;
        }

        let hl2 = bar.midpoint();
        let upper_raw = hl2 + multiplier * atr_i;
        let lower_raw = hl2 - multiplier * atr_i;

        let next = match state {
            None => FoldState {
                lower: lower_raw,
                upper: upper_raw,
                trend_line: lower_raw,
                direction: TrendDirection::Up,
                prev_close: bar.close,
            },
            Some(prev) => step(prev, lower_raw, upper_raw, bar.close),
        };

        out.trend_line.push(next.trend_line);
        out.lower.push(next.lower);
        out.upper.push(next.upper);
        out.direction.push(next.direction);
        state = Some(next);
    }

    out
}

fn step(prev: FoldState, lower_raw: f64, upper_raw: f64, close: f64) -> FoldState {
    let lower = if lower_raw > prev.lower || prev.prev_close < prev.trend_line {
        lower_raw
    } else {
        prev.lower
    };

    let upper = if upper_raw < prev.upper || prev.prev_close > prev.trend_line {
        upper_raw
    } else {
        prev.upper
    };

    let direction = match prev.direction {
        TrendDirection::Up if close < lower => TrendDirection::Down,
        TrendDirection::Down if close > upper => TrendDirection::Up,
        unchanged => unchanged,
    };

    let trend_line = match direction {
        TrendDirection::Up => lower,
        TrendDirection::Down => upper,
    };

    FoldState {
        lower,
        upper,
        trend_line,
        direction,
        prev_close: close,
    }
}
