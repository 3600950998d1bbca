pub mod bar;
pub mod bonus;
pub mod universe;
pub mod yahoo;

use std::future::Future;

use anyhow::Result;
use chrono::NaiveDate;

// Re-export the Bar struct for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::Bar;
pub use bonus::BonusContext;
pub use yahoo::YahooClient;

/// Source of daily bars.
///
/// Implementations return bars in ascending date order.  `fetch_range` may
/// legitimately return an empty vector when no session has closed yet.
pub trait BarSource {
    /// Trailing history for `symbol`; `range` is a provider range string
    /// such as `"1y"`.
    fn fetch_history(
        &self,
        symbol: &str,
        range: &str,
    ) -> impl Future<Output = Result<Vec<Bar>>> + Send;

    /// Bars dated in `[start, end)`.
    fn fetch_range(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl Future<Output = Result<Vec<Bar>>> + Send;

    /// Human-readable instrument name, empty when unknown.
    fn display_name(&self, symbol: &str) -> impl Future<Output = String> + Send;
}
