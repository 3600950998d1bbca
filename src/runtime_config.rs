// =============================================================================
// Runtime Configuration — scanner settings loaded from JSON
// =============================================================================
//
// Every tunable of a scan run lives here: indicator periods, the regression
// window, ranking size, pacing, file locations and data-source endpoints.
//
// All fields carry a serde default so that adding new fields never breaks
// loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::indicators::{obv, supertrend, volume};
use crate::regression;
use crate::signals::rank;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_ema_fast() -> usize {
    50
}

fn default_ema_slow() -> usize {
    200
}

fn default_wilder_period() -> usize {
    14
}

fn default_supertrend_period() -> usize {
    supertrend::DEFAULT_PERIOD
}

fn default_supertrend_multiplier() -> f64 {
    supertrend::DEFAULT_MULTIPLIER
}

fn default_obv_lookback() -> usize {
    obv::DEFAULT_LOOKBACK
}

fn default_volume_window() -> usize {
    volume::DEFAULT_AVERAGE_WINDOW
}

fn default_regression_window() -> usize {
    regression::DEFAULT_WINDOW
}

fn default_min_history_bars() -> usize {
    200
}

fn default_universe_path() -> PathBuf {
    PathBuf::from("stocks.txt")
}

fn default_symbol_suffix() -> String {
    ".NS".to_string()
}

fn default_alert_log_path() -> PathBuf {
    PathBuf::from("alert_log.csv")
}

fn default_history_range() -> String {
    "1y".to_string()
}

fn default_top_n() -> usize {
    rank::DEFAULT_TOP_N
}

fn default_batch_size() -> usize {
    25
}

fn default_batch_pause_ms() -> u64 {
    2000
}

fn default_message_pause_ms() -> u64 {
    600
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_delivery_url_template() -> String {
    "https://archives.nseindia.com/products/content/sec_bhavdata_full_{date}.csv".to_string()
}

fn default_results_calendar_url() -> String {
    "https://docs.google.com/spreadsheets/d/e/2PACX-1vRPYwOAHp2nWb917nR9F5QUX37yGhV7dN6q_-0falsOQx9u9BSoOKWzaHGQjPk9vQA664BiBhpC9q0H/pub?gid=0&single=true&output=csv".to_string()
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Lookback periods for the indicator library and regression channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    #[serde(default = "default_wilder_period")]
    pub rsi_period: usize,

    #[serde(default = "default_wilder_period")]
    pub adx_period: usize,

    #[serde(default = "default_wilder_period")]
    pub atr_period: usize,

    #[serde(default = "default_supertrend_period")]
    pub supertrend_period: usize,

    #[serde(default = "default_supertrend_multiplier")]
    pub supertrend_multiplier: f64,

    /// Trailing OBV values the accumulation slope is fitted over.
    #[serde(default = "default_obv_lookback")]
    pub obv_lookback: usize,

    /// Window of the volume-spike mean.
    #[serde(default = "default_volume_window")]
    pub volume_window: usize,

    /// Trailing bars fitted by the regression channel.
    #[serde(default = "default_regression_window")]
    pub regression_window: usize,

    /// Instruments with fewer bars are skipped.
    #[serde(default = "default_min_history_bars")]
    pub min_history_bars: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            rsi_period: default_wilder_period(),
            adx_period: default_wilder_period(),
            atr_period: default_wilder_period(),
            supertrend_period: default_supertrend_period(),
            supertrend_multiplier: default_supertrend_multiplier(),
            obv_lookback: default_obv_lookback(),
            volume_window: default_volume_window(),
            regression_window: default_regression_window(),
            min_history_bars: default_min_history_bars(),
        }
    }
}

// =============================================================================
// DataSources
// =============================================================================

/// Remote endpoints.  `{date}` in the delivery template is replaced with the
/// trading date as `YYYYMMDD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,

    #[serde(default = "default_delivery_url_template")]
    pub delivery_url_template: String,

    #[serde(default = "default_results_calendar_url")]
    pub results_calendar_url: String,

    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            yahoo_base_url: default_yahoo_base_url(),
            delivery_url_template: default_delivery_url_template(),
            results_calendar_url: default_results_calendar_url(),
            telegram_api_base: default_telegram_api_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl DataSources {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for a scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Universe & files ---------------------------------------------------

    /// One bare symbol per line.
    #[serde(default = "default_universe_path")]
    pub universe_path: PathBuf,

    /// Exchange suffix appended to each symbol when fetching.
    #[serde(default = "default_symbol_suffix")]
    pub symbol_suffix: String,

    #[serde(default = "default_alert_log_path")]
    pub alert_log_path: PathBuf,

    /// Yahoo range string for scan history (e.g. "1y").
    #[serde(default = "default_history_range")]
    pub history_range: String,

    // --- Ranking & pacing ---------------------------------------------------

    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// A pause is inserted after every `batch_size` instruments.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,

    #[serde(default = "default_message_pause_ms")]
    pub message_pause_ms: u64,

    // --- Nested sections ----------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    #[serde(default)]
    pub sources: DataSources,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            universe_path: default_universe_path(),
            symbol_suffix: default_symbol_suffix(),
            alert_log_path: default_alert_log_path(),
            history_range: default_history_range(),
            top_n: default_top_n(),
            batch_size: default_batch_size(),
            batch_pause_ms: default_batch_pause_ms(),
            message_pause_ms: default_message_pause_ms(),
            indicators: IndicatorParams::default(),
            sources: DataSources::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scanner config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scanner config from {}", path.display()))?;

        info!(
            path = %path.display(),
            universe = %config.universe_path.display(),
            top_n = config.top_n,
            "scanner config loaded"
        );

        Ok(config)
    }

    /// Apply `SCANNER_UNIVERSE` and `SCANNER_TOP_N` overrides.  `lookup` is
    /// normally `std::env::var(..).ok()`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SCANNER_UNIVERSE").filter(|p| !p.trim().is_empty()) {
            self.universe_path = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup("SCANNER_TOP_N") {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => self.top_n = n,
                _ => warn!(value = %raw, "ignoring invalid SCANNER_TOP_N"),
            }
        }
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn message_pause(&self) -> Duration {
        Duration::from_millis(self.message_pause_ms)
    }

    /// Symbol as sent to the market-data provider.
    pub fn provider_symbol(&self, bare: &str) -> String {
        format!("{bare}{}", self.symbol_suffix)
    }
}
