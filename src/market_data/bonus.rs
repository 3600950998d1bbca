// =============================================================================
// Bonus data — delivery percentages and results calendar
// =============================================================================
//
// Both feeds are optional.  A missing or malformed feed leaves the matching
// map empty, which simply means no instrument earns the related bonus.
//
//   delivery  exchange bhavcopy with SYMBOL, TTL_TRD_QNTY (or TOTTRDQTY),
//             DELIV_QTY; delivery % = DELIV_QTY / traded qty × 100
//   results   published sheet with "Security Name", "Result Date"
//             (dd-Mon-yy)
// =============================================================================

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

/// Per-run lookup tables consulted while building candidates.
#[derive(Debug, Clone, Default)]
pub struct BonusContext {
    delivery: HashMap<String, f64>,
    results: HashMap<String, NaiveDate>,
}

impl BonusContext {
    pub fn new(delivery: HashMap<String, f64>, results: HashMap<String, NaiveDate>) -> Self {
        Self { delivery, results }
    }

    pub fn set_delivery(&mut self, delivery: HashMap<String, f64>) {
        self.delivery = delivery;
    }

    /// Delivery percentage for a bare symbol.
    pub fn delivery_pct(&self, symbol: &str) -> Option<f64> {
        self.delivery.get(&symbol.to_uppercase()).copied()
    }

    /// Next results date for a bare symbol.
    pub fn result_date(&self, symbol: &str) -> Option<NaiveDate> {
        self.results.get(&symbol.to_uppercase()).copied()
    }

    pub fn delivery_len(&self) -> usize {
        self.delivery.len()
    }

    pub fn results_len(&self) -> usize {
        self.results.len()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
}

/// Parse a delivery bhavcopy into `SYMBOL -> delivery %`.
///
/// Rows with zero traded quantity or unparsable numbers are dropped.
pub fn parse_delivery_csv(body: &str) -> Result<HashMap<String, f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().context("delivery file has no header")?.clone();
    let sym_idx = column(&headers, &["SYMBOL"]).context("delivery file missing SYMBOL")?;
    let qty_idx = column(&headers, &["TTL_TRD_QNTY", "TOTTRDQTY"])
        .context("delivery file missing traded quantity column")?;
    let deliv_idx = column(&headers, &["DELIV_QTY"]).context("delivery file missing DELIV_QTY")?;

    let mut map = HashMap::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let (Some(sym), Some(qty), Some(deliv)) = (
            record.get(sym_idx),
            record.get(qty_idx).and_then(|v| v.parse::<f64>().ok()),
            record.get(deliv_idx).and_then(|v| v.parse::<f64>().ok()),
        ) else {
            continue;
        };
        if qty > 0.0 && !sym.is_empty() {
            map.insert(sym.to_uppercase(), deliv / qty * 100.0);
        }
    }
    Ok(map)
}

/// Parse the results calendar into `SECURITY NAME -> result date`.
pub fn parse_results_csv(body: &str) -> Result<HashMap<String, NaiveDate>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers().context("results calendar has no header")?.clone();
    let name_idx =
        column(&headers, &["Security Name"]).context("results calendar missing Security Name")?;
    let date_idx =
        column(&headers, &["Result Date"]).context("results calendar missing Result Date")?;

    let mut map = HashMap::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let (Some(name), Some(date)) = (
            record.get(name_idx).filter(|n| !n.is_empty()),
            record
                .get(date_idx)
                .and_then(|d| NaiveDate::parse_from_str(d, "%d-%b-%y").ok()),
        ) else {
            continue;
        };
        map.insert(name.to_uppercase(), date);
    }
    Ok(map)
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("GET {url} failed"))?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("GET {} returned {}", url, status);
    }
    resp.text()
        .await
        .with_context(|| format!("failed to read body of {url}"))
}

/// Download and parse the delivery file for `trading_date`.
#[instrument(skip(client, url_template))]
pub async fn fetch_delivery(
    client: &reqwest::Client,
    url_template: &str,
    trading_date: NaiveDate,
) -> Result<HashMap<String, f64>> {
    let url = url_template.replace("{date}", &trading_date.format("%Y%m%d").to_string());
    let body = get_text(client, &url).await?;
    let map = parse_delivery_csv(&body)?;
    info!(records = map.len(), %trading_date, "delivery data loaded");
    Ok(map)
}

/// Download and parse the results calendar.
#[instrument(skip(client))]
pub async fn fetch_results_calendar(
    client: &reqwest::Client,
    url: &str,
) -> Result<HashMap<String, NaiveDate>> {
    let body = get_text(client, url).await?;
    let map = parse_results_csv(&body)?;
    debug!(records = map.len(), "results calendar loaded");
    Ok(map)
}
