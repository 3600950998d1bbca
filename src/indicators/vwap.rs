// =============================================================================
// Volume-Weighted Average Price (VWAP)
// =============================================================================
//
// Anchored at the first supplied bar, not a rolling window:
//   VWAP_t = Σ(typical_price × volume) / Σ volume
// =============================================================================

use crate::market_data::Bar;

/// Cumulative VWAP aligned with `bars`.
///
/// While cumulative volume is still zero the bar's own typical price is
/// reported.
pub fn vwap_series(bars: &[Bar]) -> Vec<f64> {
    let mut pv = 0.0;
    let mut vol = 0.0;
    bars.iter()
        .map(|bar| {
            let tp = bar.typical_price();
            pv += tp * bar.volume;
            vol += bar.volume;
            if vol > 0.0 {
                pv / vol
            } else {
                tp
            }
        })
        .collect()
}

/// Distance of the last close from VWAP, in percent.
pub fn vwap_distance_pct(bars: &[Bar]) -> Option<f64> {
    let vwap = *vwap_series(bars).last()?;
    let last = bars.last()?.close;
    if vwap == 0.0 {
        return None;
    }
    Some((last - vwap) / vwap * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: usize, price: f64, volume: f64) -> Bar {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + chrono::Days::new(i as u64);
        Bar::new(date, price, price, price, price, volume)
    }

    #[test]
    fn weights_by_volume() {
        let bars = vec![bar(0, 10.0, 100.0), bar(1, 20.0, 300.0)];
        let vwap = vwap_series(&bars);
        assert!((vwap[0] - 10.0).abs() < 1e-12);
        assert!((vwap[1] - 17.5).abs() < 1e-12);
    }

    #[test]
    fn zero_volume_falls_back_to_typical_price() {
        let bars = vec![bar(0, 10.0, 0.0), bar(1, 12.0, 0.0)];
        assert_eq!(vwap_series(&bars), vec![10.0, 12.0]);
    }

    #[test]
    fn distance_sign() {
        let bars = vec![bar(0, 10.0, 100.0), bar(1, 20.0, 100.0)];
        // VWAP 15, last 20 => +33.3%
        let d = vwap_distance_pct(&bars).unwrap();
        assert!((d - 100.0 / 3.0).abs() < 1e-9);
    }
}
