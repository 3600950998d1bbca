// =============================================================================
// Yahoo Finance chart API client — daily bars
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?interval=1d&range=1y
// GET {base}/v8/finance/chart/{symbol}?interval=1d&period1=..&period2=..
//
// Rows with any null OHLCV field are dropped.  Timestamps are shifted by the
// exchange's GMT offset before taking the calendar date, so a session that
// opens at 09:15 IST is dated on its local day.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::bar::{sanitize, Bar};
use super::BarSource;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) eod-scanner";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    long_name: Option<String>,
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Decoded chart response.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub name: Option<String>,
    pub bars: Vec<Bar>,
}

/// Decode a chart response body.
pub fn parse_chart(body: &str) -> Result<ChartData> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).context("failed to parse chart response")?;

    if let Some(err) = envelope.chart.error {
        anyhow::bail!("chart API error {}: {}", err.code, err.description);
    }

    let result = envelope
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .context("chart response has no result")?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let field = |col: &[Option<f64>]| col.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
            field(&quote.volume),
        ) else {
            continue;
        };
        let Some(stamp) = DateTime::from_timestamp(ts + offset, 0) else {
            warn!(ts, "skipping bar with out-of-range timestamp");
            continue;
        };
        bars.push(Bar::new(stamp.date_naive(), open, high, low, close, volume));
    }

    let name = result
        .meta
        .short_name
        .or(result.meta.long_name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    Ok(ChartData {
        name,
        bars: sanitize(bars),
    })
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Yahoo Finance chart client.  Display names seen in chart metadata are
/// cached so `display_name` rarely costs a request.
pub struct YahooClient {
    base_url: String,
    client: reqwest::Client,
    names: Mutex<HashMap<String, String>>,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            names: Mutex::new(HashMap::new()),
        })
    }

    async fn get_chart(&self, symbol: &str, query: &[(&str, String)]) -> Result<ChartData> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol} failed"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read chart body for {symbol}"))?;

        if !status.is_success() {
            anyhow::bail!("chart API returned {} for {}: {}", status, symbol, body);
        }

        let data = parse_chart(&body)?;
        if let Some(name) = &data.name {
            self.names.lock().insert(symbol.to_string(), name.clone());
        }
        Ok(data)
    }
}

impl BarSource for YahooClient {
    #[instrument(skip(self), name = "yahoo::fetch_history")]
    async fn fetch_history(&self, symbol: &str, range: &str) -> Result<Vec<Bar>> {
        let query = [
            ("interval", "1d".to_string()),
            ("range", range.to_string()),
        ];
        let data = self.get_chart(symbol, &query).await?;
        debug!(symbol, count = data.bars.len(), "history fetched");
        Ok(data.bars)
    }

    #[instrument(skip(self), name = "yahoo::fetch_range")]
    async fn fetch_range(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let query = [
            ("interval", "1d".to_string()),
            ("period1", unix_midnight(start).to_string()),
            ("period2", unix_midnight(end).to_string()),
        ];
        let data = self.get_chart(symbol, &query).await?;
        let bars: Vec<Bar> = data
            .bars
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();
        debug!(symbol, %start, %end, count = bars.len(), "range fetched");
        Ok(bars)
    }

    #[instrument(skip(self), name = "yahoo::display_name")]
    async fn display_name(&self, symbol: &str) -> String {
        let cached = self.names.lock().get(symbol).cloned();
        if let Some(name) = cached {
            return name;
        }
        let query = [
            ("interval", "1d".to_string()),
            ("range", "5d".to_string()),
        ];
        match self.get_chart(symbol, &query).await {
            Ok(data) => data.name.unwrap_or_default(),
            Err(e) => {
                debug!(symbol, error = %e, "display name lookup failed");
                String::new()
            }
        }
    }
}
