// =============================================================================
// Outcome Tracker — reconcile past alerts against realised price action
// =============================================================================
//
// For every record that is not yet `complete`:
//
//   1. Fetch bars from the day after the alert through today
//   2. Fill checkpoint returns (3 / 5 / 10 / 20 bars) that are still empty
//   3. Over the first `pred_timeframe_days` bars, test target and stop:
//        Bullish  target hit = max(high) >= target, stop hit = min(low) <= stop
//        Bearish  target hit = min(low) <= target,  stop hit = max(high) >= stop
//   4. Outcome: Both Hit | Target Hit | SL Hit | Expired (window elapsed)
//      | Pending
//   5. Status: complete once all four returns exist, otherwise partial if
//      anything changed this pass
//
// A record only completes after its 20-bar checkpoint, so short-timeframe
// alerts stay `partial` after their target or stop resolves.  Running the
// pass twice with no new bars changes nothing.
// =============================================================================

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::alert_log::{round2, AlertRecord, LogEntry, Outcome, Status};
use crate::market_data::{Bar, BarSource};

// ---------------------------------------------------------------------------
// Result type
// ---------------------------------------------------------------------------

/// Summary of a single reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileSummary {
    /// Records that were not complete at the start of the pass.
    pub examined: u32,
    /// Records whose fields changed.
    pub updated: u32,
    /// Records that reached `complete` in this pass.
    pub completed: u32,
    /// Records with no new bars yet.
    pub no_data: u32,
    /// Records whose fetch failed.
    pub failed: u32,
    /// ISO-8601 timestamp of this pass.
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Record-level state machine
// ---------------------------------------------------------------------------

/// Apply the post-alert `bars` (ascending, starting the session after the
/// alert) to `record`.  Returns whether any field changed.
///
/// # Edge cases
/// - No bars, or a non-positive alert price: nothing changes.
/// - A timeframe of zero leaves hit flags and outcome untouched.
pub fn reconcile_record(record: &mut AlertRecord, bars: &[Bar]) -> bool {
    let base = record.alert_price;
    if bars.is_empty() || !(base.is_finite() && base > 0.0) {
        return false;
    }
    let before = record.clone();

    for (n, slot) in record.checkpoints_mut() {
        if slot.is_none() && bars.len() >= n {
            *slot = Some(round2((bars[n - 1].close - base) / base * 100.0));
        }
    }

    let timeframe = record.pred_timeframe_days as usize;
    let window = &bars[..timeframe.min(bars.len())];
    if !window.is_empty() {
        let max_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let min_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        let (target_hit, sl_hit) = if record.pred_direction.is_bullish() {
            (
                max_high >= record.pred_target_price,
                min_low <= record.pred_stop_loss,
            )
        } else {
            (
                min_low <= record.pred_target_price,
                max_high >= record.pred_stop_loss,
            )
        };

        record.target_hit = Some(target_hit);
        record.sl_hit = Some(sl_hit);
        record.outcome = Some(match (target_hit, sl_hit) {
            (true, true) => Outcome::BothHit,
            (true, false) => Outcome::TargetHit,
            (false, true) => Outcome::SlHit,
            (false, false) if bars.len() >= timeframe => Outcome::Expired,
            (false, false) => Outcome::Pending,
        });
    }

    if record.all_checkpoints_filled() {
        record.status = Status::Complete;
    } else if *record != before {
        record.status = Status::Partial;
    }

    *record != before
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run one reconciliation pass over `entries` in place.
///
/// `symbol_suffix` is appended to each record's bare symbol when fetching.
/// Unparsed rows and complete records are left untouched; a failed fetch
/// affects only its own record.
pub async fn reconcile_all<S: BarSource>(
    source: &S,
    entries: &mut [LogEntry],
    today: NaiveDate,
    symbol_suffix: &str,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary {
        timestamp: Utc::now().to_rfc3339(),
        ..ReconcileSummary::default()
    };
    info!(timestamp = %summary.timestamp, "reconciliation pass started");

    let Some(end) = today.checked_add_days(Days::new(1)) else {
        return summary;
    };

    for entry in entries.iter_mut() {
        let LogEntry::Record(record) = entry else {
            continue;
        };
        if record.is_complete() {
            continue;
        }
        summary.examined += 1;

        let Some(start) = record.alert_date.checked_add_days(Days::new(1)) else {
            continue;
        };
        if start >= end {
            summary.no_data += 1;
            continue;
        }

        let provider_symbol = format!("{}{}", record.symbol, symbol_suffix);
        let bars = match source.fetch_range(&provider_symbol, start, end).await {
            Ok(bars) => bars,
            Err(e) => {
                summary.failed += 1;
                warn!(
                    symbol = %record.symbol,
                    alert_date = %record.alert_date,
                    error = %e,
                    "performance fetch failed"
                );
                continue;
            }
        };
        if bars.is_empty() {
            summary.no_data += 1;
            continue;
        }

        if reconcile_record(record, &bars) {
            summary.updated += 1;
            if record.is_complete() {
                summary.completed += 1;
            }
            debug!(
                symbol = %record.symbol,
                alert_date = %record.alert_date,
                outcome = ?record.outcome,
                status = %record.status,
                "alert updated"
            );
        }
    }

    info!(
        examined = summary.examined,
        updated = summary.updated,
        completed = summary.completed,
        no_data = summary.no_data,
        failed = summary.failed,
        "reconciliation pass finished"
    );
    summary
}
