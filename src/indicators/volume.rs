// =============================================================================
// Volume spike
// =============================================================================

use crate::market_data::Bar;

pub const DEFAULT_AVERAGE_WINDOW: usize = 20;

/// Percentage by which the last bar's volume exceeds the trailing mean
/// (the mean includes the last bar).
///
/// Returns 0 when the mean is not positive or there are no bars.
pub fn volume_spike_pct(bars: &[Bar], window: usize) -> f64 {
    let Some(last) = bars.last() else {
        return 0.0;
    };
    if window == 0 {
        return 0.0;
    }
    let start = bars.len().saturating_sub(window);
    let slice = &bars[start..];
    let avg = slice.iter().map(|b| b.volume).sum::<f64>() / slice.len() as f64;
    if avg > 0.0 {
        (last.volume - avg) / avg * 100.0
    } else {
        0.0
    }
}
