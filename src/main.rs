// =============================================================================
// EOD Setup Scanner — Main Entry Point
// =============================================================================
//
// One run per trading day, after the close:
//
//   1. Load config, universe and the per-run bonus data
//   2. Scan every instrument and rank the candidates
//   3. Deliver the top setups and append them to the alert log
//   4. Reconcile earlier alerts against the bars printed since
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod alert_log;
mod error;
mod indicators;
mod market_data;
mod notify;
mod prediction;
mod reconcile;
mod regression;
mod runtime_config;
mod scanner;
mod setup;
mod signals;
mod types;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::alert_log::AlertRecord;
use crate::market_data::bonus::{fetch_delivery, fetch_results_calendar};
use crate::market_data::universe::load_universe;
use crate::market_data::{BarSource, BonusContext, YahooClient};
use crate::notify::format::{candidate_card, header, DISCLAIMER, NO_SETUPS};
use crate::notify::Notifier;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "scanner_config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("EOD setup scanner starting");

    let config_path =
        std::env::var("SCANNER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_overrides(|key| std::env::var(key).ok());

    let symbols = load_universe(&config.universe_path)?;
    let today = Local::now().date_naive();

    // ── 2. Clients & bonus data ──────────────────────────────────────────
    let source = YahooClient::new(
        config.sources.yahoo_base_url.clone(),
        config.sources.request_timeout(),
    )?;
    let http = reqwest::Client::builder()
        .timeout(config.sources.request_timeout())
        .user_agent("Mozilla/5.0 (X11; Linux x86_64) eod-scanner")
        .build()
        .context("failed to build HTTP client")?;

    let mut bonus = BonusContext::default();
    match fetch_results_calendar(&http, &config.sources.results_calendar_url).await {
        Ok(results) => bonus = BonusContext::new(Default::default(), results),
        Err(e) => warn!(error = %e, "results calendar unavailable"),
    }
    if let Some(session) = latest_session(&source, &config, &symbols).await {
        match fetch_delivery(&http, &config.sources.delivery_url_template, session).await {
            Ok(delivery) => bonus.set_delivery(delivery),
            Err(e) => warn!(error = %e, %session, "delivery data unavailable"),
        }
    }
    info!(
        delivery = bonus.delivery_len(),
        results = bonus.results_len(),
        "bonus data ready"
    );

    // ── 3. Scan & rank ───────────────────────────────────────────────────
    let summary = scanner::scan_universe(&source, &config, &symbols, &bonus).await;
    let top = signals::select_top(summary.candidates, config.top_n);

    // ── 4. Deliver & log ─────────────────────────────────────────────────
    let notifier = Notifier::from_lookup(&config.sources, |key| std::env::var(key).ok())?;

    if top.is_empty() {
        notifier.send(NO_SETUPS).await;
    } else {
        notifier.send(&header(today, top.len(), symbols.len())).await;
        tokio::time::sleep(config.message_pause()).await;

        let mut records = Vec::with_capacity(top.len());
        for (rank, candidate) in top.iter().enumerate() {
            notifier.send(&candidate_card(rank + 1, candidate)).await;
            tokio::time::sleep(config.message_pause()).await;
            records.push(AlertRecord::from_candidate(candidate, today));
        }

        if let Err(e) = alert_log::append(&config.alert_log_path, &records) {
            warn!(error = %e, "failed to append alerts");
        }
        notifier.send(DISCLAIMER).await;
    }

    // ── 5. Reconcile past alerts ─────────────────────────────────────────
    info!("checking past alert performance");
    match alert_log::load(&config.alert_log_path) {
        Ok(mut entries) => {
            reconcile::reconcile_all(&source, &mut entries, today, &config.symbol_suffix).await;
            if let Err(e) = alert_log::save(&config.alert_log_path, &entries) {
                warn!(error = %e, "failed to rewrite alert log");
            }
        }
        Err(e) => warn!(error = %e, "alert log unreadable, reconciliation skipped"),
    }

    info!(setups = top.len(), scanned = symbols.len(), "run complete");
    Ok(())
}

/// Date of the most recent session, taken from the first instrument that
/// returns any bars.
async fn latest_session<S: BarSource>(
    source: &S,
    config: &RuntimeConfig,
    symbols: &[String],
) -> Option<NaiveDate> {
    for symbol in symbols.iter().take(3) {
        match source.fetch_history(&config.provider_symbol(symbol), "5d").await {
            Ok(bars) => {
                if let Some(last) = bars.last() {
                    return Some(last.date);
                }
            }
            Err(e) => warn!(symbol = %symbol, error = %e, "session lookup failed"),
        }
    }
    None
}
