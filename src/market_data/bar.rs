use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One end-of-day OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// (high + low) / 2
    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Whether every price field is finite and the volume is non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}

/// Extract the close column.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Drop malformed bars and any bar whose date does not strictly follow the
/// previous kept bar.  Data providers occasionally repeat the last session or
/// emit null rows; downstream indicators assume a clean ascending series.
pub fn sanitize(bars: Vec<Bar>) -> Vec<Bar> {
    let mut clean: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        if !bar.is_well_formed() {
            continue;
        }
        if let Some(prev) = clean.last() {
            if bar.date <= prev.date {
                continue;
            }
        }
        clean.push(bar);
    }
    clean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn sanitize_drops_nan_and_repeated_dates() {
        let bars = vec![
            Bar::new(day(1), 1.0, 2.0, 0.5, 1.5, 10.0),
            Bar::new(day(2), 1.0, f64::NAN, 0.5, 1.5, 10.0),
            Bar::new(day(2), 1.0, 2.0, 0.5, 1.6, 10.0),
            Bar::new(day(2), 1.0, 2.0, 0.5, 1.7, 10.0),
            Bar::new(day(3), 1.0, 2.0, 0.5, 1.8, 10.0),
        ];
        let clean = sanitize(bars);
        assert_eq!(clean.len(), 3);
        assert_eq!(clean[1].close, 1.6);
        assert_eq!(clean[2].date, day(3));
    }

    #[test]
    fn typical_price_and_midpoint() {
        let bar = Bar::new(day(1), 10.0, 12.0, 8.0, 11.0, 1.0);
        assert!((bar.typical_price() - 31.0 / 3.0).abs() < 1e-12);
        assert!((bar.midpoint() - 10.0).abs() < 1e-12);
    }
}
