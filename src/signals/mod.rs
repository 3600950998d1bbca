// =============================================================================
// Signals Module
// =============================================================================
//
// Turning per-instrument readings into decisions:
// - Six-signal majority vote (direction + confidence tier)
// - Additive ranking score and top-N selection

pub mod rank;
pub mod vote;

pub use rank::select_top;
