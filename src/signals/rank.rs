// =============================================================================
// Candidate ranking
// =============================================================================
//
// The score is an ordering key only and never shown to the user:
//
//   setup base   GoldenCross 50 | ApproachingEMA200 40 | EMA50Pullback 35
//                | proximity fallback 20
//   votes        +5 per bullish vote
//   bonuses      +5 each: RSI > 50, MACD histogram > 0, ADX > 25,
//                delivery >= 40%, near a Fibonacci level
// =============================================================================

use crate::scanner::Candidate;
use crate::setup::SetupKind;

/// Default number of candidates kept after ranking.
pub const DEFAULT_TOP_N: usize = 15;

const VOTE_POINTS: u32 = 5;
const BONUS_POINTS: u32 = 5;
const RSI_BONUS_ABOVE: f64 = 50.0;
const ADX_BONUS_ABOVE: f64 = 25.0;
const DELIVERY_BONUS_MIN_PCT: f64 = 40.0;

/// Everything the score depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub setup: SetupKind,
    pub bullish_votes: u8,
    pub rsi: f64,
    pub macd_hist: f64,
    pub adx: f64,
    pub delivery_pct: Option<f64>,
    pub near_fib: bool,
}

fn setup_base(kind: SetupKind) -> u32 {
    match kind {
        SetupKind::GoldenCross => 50,
        SetupKind::ApproachingEma200 => 40,
        SetupKind::Ema50Pullback => 35,
        SetupKind::NearEma200 | SetupKind::NearEma50 => 20,
    }
}

/// Additive ranking score.
pub fn score(inputs: &ScoreInputs) -> u32 {
    let bonuses = [
        inputs.rsi > RSI_BONUS_ABOVE,
        inputs.macd_hist > 0.0,
        inputs.adx > ADX_BONUS_ABOVE,
        inputs
            .delivery_pct
            .is_some_and(|d| d >= DELIVERY_BONUS_MIN_PCT),
        inputs.near_fib,
    ];
    let bonus_count = bonuses.iter().filter(|&&b| b).count() as u32;

    setup_base(inputs.setup)
        + VOTE_POINTS * u32::from(inputs.bullish_votes)
        + BONUS_POINTS * bonus_count
}

/// Sort descending by score, keeping scan order among equal scores, and
/// keep the first `top_n`.
pub fn select_top(mut candidates: Vec<Candidate>, top_n: usize) -> Vec<Candidate> {
    // `sort_by` is stable.
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(top_n);
    candidates
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(setup: SetupKind) -> ScoreInputs {
        ScoreInputs {
            setup,
            bullish_votes: 0,
            rsi: 40.0,
            macd_hist: -1.0,
            adx: 15.0,
            delivery_pct: None,
            near_fib: false,
        }
    }

    #[test]
    fn base_points_by_setup() {
        assert_eq!(score(&inputs(SetupKind::GoldenCross)), 50);
        assert_eq!(score(&inputs(SetupKind::ApproachingEma200)), 40);
        assert_eq!(score(&inputs(SetupKind::Ema50Pullback)), 35);
        assert_eq!(score(&inputs(SetupKind::NearEma200)), 20);
        assert_eq!(score(&inputs(SetupKind::NearEma50)), 20);
    }

    #[test]
    fn maximum_score() {
        let s = score(&ScoreInputs {
            setup: SetupKind::GoldenCross,
            bullish_votes: 6,
            rsi: 60.0,
            macd_hist: 0.5,
            adx: 30.0,
            delivery_pct: Some(55.0),
            near_fib: true,
        });
        assert_eq!(s, 50 + 30 + 25);
    }

    #[test]
    fn bonus_thresholds_are_strict_except_delivery() {
        let s = score(&ScoreInputs {
            rsi: 50.0,
            macd_hist: 0.0,
            adx: 25.0,
            delivery_pct: Some(40.0),
            ..inputs(SetupKind::NearEma50)
        });
        assert_eq!(s, 20 + 5);

        let s = score(&ScoreInputs {
            delivery_pct: Some(39.9),
            ..inputs(SetupKind::NearEma50)
        });
        assert_eq!(s, 20);
    }

    #[test]
    fn select_top_is_stable_descending() {
        use crate::scanner::tests::sample_candidate;

        let ranked = select_top(
            vec![
                sample_candidate("A", 60),
                sample_candidate("B", 80),
                sample_candidate("C", 60),
                sample_candidate("D", 95),
                sample_candidate("E", 60),
            ],
            4,
        );
        let order: Vec<&str> = ranked.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(order, vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn votes_add_five_each() {
        let s = score(&ScoreInputs {
            bullish_votes: 4,
            ..inputs(SetupKind::Ema50Pullback)
        });
        assert_eq!(s, 35 + 20);
    }
}
