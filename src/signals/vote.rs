// =============================================================================
// Six-signal majority vote
// =============================================================================
//
// Each signal casts exactly one vote, bullish or bearish:
//
//   trend_filter   price above EMA200
//   regression     channel slope UP
//   supertrend     trend-flip direction +1
//   rsi            oscillator above 50
//   macd           histogram above 0
//   obv            accumulation slope rising
//
// Three or more bullish votes make the call Bullish (a 3-3 split resolves
// Bullish).  Confidence is read off the winning side's count.
// =============================================================================

use serde::Serialize;

use crate::types::{Confidence, Direction, Trend};

/// Total number of voting signals.
pub const SIGNAL_COUNT: u8 = 6;

const BULLISH_MAJORITY: u8 = 3;
const RSI_MIDLINE: f64 = 50.0;

/// Latest-bar readings consumed by the vote.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteInputs {
    pub price: f64,
    pub ema200: f64,
    pub trend: Trend,
    pub supertrend: i8,
    pub rsi: f64,
    pub macd_hist: f64,
    pub obv_rising: bool,
}

/// One signal's ballot.
#[derive(Debug, Clone, Serialize)]
pub struct SignalVote {
    pub name: &'static str,
    pub bullish: bool,
}

/// Outcome of the vote.
#[derive(Debug, Clone, Serialize)]
pub struct VoteResult {
    pub direction: Direction,
    pub bullish_votes: u8,
    pub confidence: Confidence,
    pub ballots: Vec<SignalVote>,
}

impl VoteResult {
    pub fn bearish_votes(&self) -> u8 {
        SIGNAL_COUNT - self.bullish_votes
    }
}

/// Cast the six votes and tally them.
///
/// # Edge cases
/// - NaN readings compare false and therefore vote bearish.
pub fn vote(inputs: &VoteInputs) -> VoteResult {
    let ballots = vec![
        SignalVote {
            name: "trend_filter",
            bullish: inputs.price > inputs.ema200,
        },
        SignalVote {
            name: "regression",
            bullish: inputs.trend == Trend::Up,
        },
        SignalVote {
            name: "supertrend",
            bullish: inputs.supertrend > 0,
        },
        SignalVote {
            name: "rsi",
            bullish: inputs.rsi > RSI_MIDLINE,
        },
        SignalVote {
            name: "macd",
            bullish: inputs.macd_hist > 0.0,
        },
        SignalVote {
            name: "obv",
            bullish: inputs.obv_rising,
        },
    ];

    let bullish_votes = ballots.iter().filter(|b| b.bullish).count() as u8;
    let direction = if bullish_votes >= BULLISH_MAJORITY {
        Direction::Bullish
    } else {
        Direction::Bearish
    };

    let mut result = VoteResult {
        direction,
        bullish_votes,
        confidence: Confidence::Low,
        ballots,
    };
    result.confidence = Confidence::from_votes(bullish_votes.max(result.bearish_votes()));
    result
}
