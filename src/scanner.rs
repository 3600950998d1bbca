// =============================================================================
// Scanner — per-instrument evaluation pipeline
// =============================================================================
//
// For every symbol in the universe:
//
//   1. Fetch the trailing daily history (skip on failure)
//   2. Require at least `min_history_bars` bars
//   3. Compute the indicator snapshot and the regression channel
//   4. Classify the setup; no setup means the symbol is dropped
//   5. Six-signal vote → direction + confidence
//   6. Prediction: target, stop, timeframe
//   7. Look up bonus data and compute the ranking score
//
// Instruments are processed sequentially with a pause after every batch.
// One instrument failing never affects another.
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{ScanError, ScanResult};
use crate::indicators::adx::adx_series;
use crate::indicators::atr::calculate_atr_pct;
use crate::indicators::ema::ewm_mean;
use crate::indicators::fibonacci::{nearest_fib_level, FibLevel};
use crate::indicators::last_finite;
use crate::indicators::macd::default_histogram;
use crate::indicators::obv::obv_rising;
use crate::indicators::rsi::{calculate_rsi, NEUTRAL_RSI};
use crate::indicators::supertrend::supertrend;
use crate::indicators::volume::volume_spike_pct;
use crate::indicators::vwap::vwap_distance_pct;
use crate::market_data::bar::closes;
use crate::market_data::{Bar, BarSource, BonusContext};
use crate::prediction::{predict, Prediction, PredictionInputs};
use crate::regression::RegressionChannel;
use crate::runtime_config::{IndicatorParams, RuntimeConfig};
use crate::setup::{classify, Setup, SetupInputs};
use crate::signals::rank::{score, ScoreInputs};
use crate::signals::vote::{vote, VoteInputs};
use crate::types::Confidence;

// =============================================================================
// Data types
// =============================================================================

/// Indicator values at the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub ema50: f64,
    pub ema200: f64,
    pub rsi: f64,
    pub adx: f64,
    /// ATR as a percent of the last close.
    pub atr_pct: f64,
    pub volume_spike_pct: f64,
    pub macd_hist: f64,
    /// +1 up, -1 down.
    pub supertrend: i8,
    pub obv_rising: bool,
    pub vwap_dist_pct: Option<f64>,
}

/// A ranked scan result.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub score: u32,
    /// Bare symbol, without the exchange suffix.
    pub symbol: String,
    pub name: String,
    pub setup: Setup,
    pub price: f64,
    /// Date of the latest bar.
    pub as_of: NaiveDate,
    pub channel: RegressionChannel,
    pub indicators: IndicatorSnapshot,
    pub prediction: Prediction,
    pub delivery_pct: Option<f64>,
    pub result_date: Option<NaiveDate>,
    pub confidence: Confidence,
    pub bullish_votes: u8,
    pub fib: Option<FibLevel>,
}

/// Totals of one pass over the universe.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub candidates: Vec<Candidate>,
    pub scanned: usize,
    /// Fetched and analysed but matched no setup.
    pub no_setup: usize,
    /// Fetch failures and per-instrument errors.
    pub failed: usize,
}

// =============================================================================
// Pure evaluation
// =============================================================================

/// Evaluate one instrument's history.
///
/// Returns `Ok(None)` when no setup matches.  The candidate's `name` is left
/// empty for the caller to fill.
///
/// # Errors
/// - `InsufficientHistory` below `params.min_history_bars`
/// - `InvalidPrice` when the last close is not positive
pub fn analyze(
    symbol: &str,
    bars: &[Bar],
    params: &IndicatorParams,
    bonus: &BonusContext,
) -> ScanResult<Option<Candidate>> {
    let required = params.min_history_bars.max(2);
    if bars.len() < required {
        return Err(ScanError::InsufficientHistory {
            required,
            got: bars.len(),
        });
    }
    let Some(last_bar) = bars.last() else {
        return Err(ScanError::InsufficientHistory { required, got: 0 });
    };

    let price = last_bar.close;
    if !(price.is_finite() && price > 0.0) {
        return Err(ScanError::InvalidPrice(price));
    }

    // ── Indicators ───────────────────────────────────────────────────────
    let closes = closes(bars);
    let ema50 = ewm_mean(&closes, params.ema_fast);
    let ema200 = ewm_mean(&closes, params.ema_slow);
    let rsi = calculate_rsi(&closes, params.rsi_period);
    let macd = default_histogram(&closes);

    let snapshot = IndicatorSnapshot {
        ema50: last_finite(&ema50).unwrap_or(price),
        ema200: last_finite(&ema200).unwrap_or(price),
        rsi: last_finite(&rsi).unwrap_or(NEUTRAL_RSI),
        adx: last_finite(&adx_series(bars, params.adx_period)).unwrap_or(0.0),
        atr_pct: calculate_atr_pct(bars, params.atr_period).unwrap_or(0.0),
        volume_spike_pct: volume_spike_pct(bars, params.volume_window),
        macd_hist: last_finite(&macd).unwrap_or(0.0),
        supertrend: supertrend(bars, params.supertrend_period, params.supertrend_multiplier)
            .last_sign(),
        obv_rising: obv_rising(bars, params.obv_lookback),
        vwap_dist_pct: vwap_distance_pct(bars),
    };

    // ── Setup ────────────────────────────────────────────────────────────
    let Some(setup) = classify(&SetupInputs {
        closes: &closes,
        ema50: &ema50,
        ema200: &ema200,
        macd_hist: &macd,
        rsi: &rsi,
    }) else {
        debug!(symbol, "no setup");
        return Ok(None);
    };

    let channel = RegressionChannel::fit(&closes, params.regression_window).ok_or(
        ScanError::InsufficientHistory {
            required: 2,
            got: closes.len(),
        },
    )?;

    // ── Vote + prediction ────────────────────────────────────────────────
    let ballot = vote(&VoteInputs {
        price,
        ema200: snapshot.ema200,
        trend: channel.trend(),
        supertrend: snapshot.supertrend,
        rsi: snapshot.rsi,
        macd_hist: snapshot.macd_hist,
        obv_rising: snapshot.obv_rising,
    });

    let prediction = predict(&PredictionInputs {
        price,
        direction: ballot.direction,
        channel: &channel,
        atr_pct: snapshot.atr_pct,
        adx: snapshot.adx,
        setup: setup.kind,
    })?;

    // ── Bonus + score ────────────────────────────────────────────────────
    let delivery_pct = bonus.delivery_pct(symbol);
    let fib = nearest_fib_level(bars);

    let score = score(&ScoreInputs {
        setup: setup.kind,
        bullish_votes: ballot.bullish_votes,
        rsi: snapshot.rsi,
        macd_hist: snapshot.macd_hist,
        adx: snapshot.adx,
        delivery_pct,
        near_fib: fib.is_some(),
    });

    debug!(
        symbol,
        setup = %setup.kind,
        direction = %ballot.direction,
        votes = ballot.bullish_votes,
        score,
        "candidate"
    );

    Ok(Some(Candidate {
        score,
        symbol: symbol.to_string(),
        name: String::new(),
        setup,
        price,
        as_of: last_bar.date,
        channel,
        indicators: snapshot,
        prediction,
        delivery_pct,
        result_date: bonus.result_date(symbol),
        confidence: ballot.confidence,
        bullish_votes: ballot.bullish_votes,
        fib,
    }))
}

// =============================================================================
// Universe pass
// =============================================================================

/// Fetch and evaluate one instrument.
///
/// A failed history fetch is reported as `ScanError::Unavailable`.  The
/// display name is only looked up for instruments that produce a candidate.
pub async fn scan_symbol<S: BarSource>(
    source: &S,
    cfg: &RuntimeConfig,
    symbol: &str,
    bonus: &BonusContext,
) -> ScanResult<Option<Candidate>> {
    let provider_symbol = cfg.provider_symbol(symbol);
    let bars = source
        .fetch_history(&provider_symbol, &cfg.history_range)
        .await
        .map_err(|e| ScanError::Unavailable(format!("{provider_symbol}: {e:#}")))?;

    let Some(mut candidate) = analyze(symbol, &bars, &cfg.indicators, bonus)? else {
        return Ok(None);
    };
    candidate.name = source.display_name(&provider_symbol).await;
    Ok(Some(candidate))
}

/// Scan `symbols` sequentially, pausing after every `cfg.batch_size`
/// instruments.  Candidates are returned in scan order, unranked.
pub async fn scan_universe<S: BarSource>(
    source: &S,
    cfg: &RuntimeConfig,
    symbols: &[String],
    bonus: &BonusContext,
) -> ScanSummary {
    let mut summary = ScanSummary::default();

    for (i, symbol) in symbols.iter().enumerate() {
        summary.scanned += 1;

        match scan_symbol(source, cfg, symbol, bonus).await {
            Ok(Some(candidate)) => summary.candidates.push(candidate),
            Ok(None) => summary.no_setup += 1,
            Err(e @ ScanError::InsufficientHistory { .. }) => {
                summary.failed += 1;
                debug!(symbol = %symbol, error = %e, "skipped");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(symbol = %symbol, error = %e, "skipped");
            }
        }

        if cfg.batch_size > 0 && (i + 1) % cfg.batch_size == 0 && i + 1 < symbols.len() {
            debug!(done = i + 1, "batch pause");
            tokio::time::sleep(cfg.batch_pause()).await;
        }
    }

    info!(
        scanned = summary.scanned,
        candidates = summary.candidates.len(),
        no_setup = summary.no_setup,
        failed = summary.failed,
        "scan complete"
    );
    summary
}
