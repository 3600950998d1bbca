// =============================================================================
// Alert Log — CSV persistence of delivered alerts
// =============================================================================
//
// One row per delivered alert, columns in this order:
//
//   alert_date, symbol, setup_type, alert_price, pred_direction,
//   pred_target_pct, pred_target_price, pred_stop_loss, pred_timeframe_days,
//   ret_3d, ret_5d, ret_10d, ret_20d, target_hit, sl_hit, outcome, status
//
// Hit flags are written `True` / `False`; checkpoint returns with two
// decimals.  Rows that fail to parse are kept as raw records and written
// back untouched, so a rewrite never loses data.
// =============================================================================

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::scanner::Candidate;
use crate::types::Direction;

pub const LOG_COLUMNS: [&str; 17] = [
    "alert_date",
    "symbol",
    "setup_type",
    "alert_price",
    "pred_direction",
    "pred_target_pct",
    "pred_target_price",
    "pred_stop_loss",
    "pred_timeframe_days",
    "ret_3d",
    "ret_5d",
    "ret_10d",
    "ret_20d",
    "target_hit",
    "sl_hit",
    "outcome",
    "status",
];

/// Round to two decimals, the precision every price and return is logged at.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// =============================================================================
// Record types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "Target Hit")]
    TargetHit,
    #[serde(rename = "SL Hit")]
    SlHit,
    #[serde(rename = "Both Hit")]
    BothHit,
    Expired,
    Pending,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetHit => write!(f, "Target Hit"),
            Self::SlHit => write!(f, "SL Hit"),
            Self::BothHit => write!(f, "Both Hit"),
            Self::Expired => write!(f, "Expired"),
            Self::Pending => write!(f, "Pending"),
        }
    }
}

/// Lifecycle of a record: pending → partial → complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Partial,
    Complete,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Partial => write!(f, "partial"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// One persisted alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub alert_date: NaiveDate,
    pub symbol: String,
    pub setup_type: String,
    pub alert_price: f64,
    pub pred_direction: Direction,
    pub pred_target_pct: f64,
    pub pred_target_price: f64,
    pub pred_stop_loss: f64,
    pub pred_timeframe_days: u32,
    #[serde(with = "two_decimals")]
    pub ret_3d: Option<f64>,
    #[serde(with = "two_decimals")]
    pub ret_5d: Option<f64>,
    #[serde(with = "two_decimals")]
    pub ret_10d: Option<f64>,
    #[serde(with = "two_decimals")]
    pub ret_20d: Option<f64>,
    #[serde(with = "python_bool")]
    pub target_hit: Option<bool>,
    #[serde(with = "python_bool")]
    pub sl_hit: Option<bool>,
    pub outcome: Option<Outcome>,
    pub status: Status,
}

impl AlertRecord {
    /// Fresh `pending` record for a delivered candidate.
    pub fn from_candidate(c: &Candidate, alert_date: NaiveDate) -> Self {
        Self {
            alert_date,
            symbol: c.symbol.clone(),
            setup_type: format!("{} {}", c.setup.kind.icon(), c.setup.kind),
            alert_price: round2(c.price),
            pred_direction: c.prediction.direction,
            pred_target_pct: round2(c.prediction.target_pct),
            pred_target_price: round2(c.prediction.target_price),
            pred_stop_loss: round2(c.prediction.stop_loss),
            pred_timeframe_days: c.prediction.timeframe_days,
            ret_3d: None,
            ret_5d: None,
            ret_10d: None,
            ret_20d: None,
            target_hit: None,
            sl_hit: None,
            outcome: Some(Outcome::Pending),
            status: Status::Pending,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }

    /// Checkpoint returns keyed by trading-day offset.
    pub fn checkpoints_mut(&mut self) -> [(usize, &mut Option<f64>); 4] {
        [
            (3, &mut self.ret_3d),
            (5, &mut self.ret_5d),
            (10, &mut self.ret_10d),
            (20, &mut self.ret_20d),
        ]
    }

    pub fn all_checkpoints_filled(&self) -> bool {
        self.ret_3d.is_some() && self.ret_5d.is_some() && self.ret_10d.is_some() && self.ret_20d.is_some()
    }
}

/// A log row: either a parsed record or the raw bytes of a row that did not
/// parse (bad values, wrong field count, invalid UTF-8).
#[derive(Debug, Clone, PartialEq)]
pub enum LogEntry {
    Record(AlertRecord),
    Unparsed(csv::ByteRecord),
}

// =============================================================================
// File operations
// =============================================================================

/// Create the log with its header row if it does not exist yet.
pub fn init(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create alert log {}", path.display()))?;
    writer.write_record(LOG_COLUMNS)?;
    writer.flush()?;
    info!(path = %path.display(), "alert log created");
    Ok(())
}

/// Read every row.  A missing file is an empty log.  Rows that do not map
/// onto [`AlertRecord`] are kept as [`LogEntry::Unparsed`].
pub fn load(path: impl AsRef<Path>) -> Result<Vec<LogEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open alert log {}", path.display()))?;
    let headers = reader.byte_headers()?.clone();

    let mut entries = Vec::new();
    for (line, raw) in reader.byte_records().enumerate() {
        // A read failure aborts the load so the caller never rewrites a
        // partial log.
        let raw = raw.with_context(|| format!("failed to read alert log line {}", line + 2))?;
        match raw.deserialize::<AlertRecord>(Some(&headers)) {
            Ok(record) => entries.push(LogEntry::Record(record)),
            Err(e) => {
                warn!(line = line + 2, error = %e, "alert log row kept unparsed");
                entries.push(LogEntry::Unparsed(raw));
            }
        }
    }
    Ok(entries)
}

/// Append new records, creating the file with a header when needed.
pub fn append(path: impl AsRef<Path>, records: &[AlertRecord]) -> Result<()> {
    let path = path.as_ref();
    init(path)?;

    let file = OpenOptions::new()
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open alert log {} for append", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), count = records.len(), "alerts logged");
    Ok(())
}

/// Rewrite the whole log atomically (write `.tmp`, then rename).
pub fn save(path: impl AsRef<Path>, entries: &[LogEntry]) -> Result<()> {
    let path = path.as_ref();
    let tmp_path = path.with_extension("csv.tmp");

    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&tmp_path)
            .with_context(|| format!("failed to create {}", tmp_path.display()))?;
        writer.write_record(LOG_COLUMNS)?;
        for entry in entries {
            match entry {
                LogEntry::Record(record) => writer.serialize(record)?,
                LogEntry::Unparsed(raw) => writer.write_byte_record(raw)?,
            }
        }
        writer.flush()?;
    }

    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("failed to rename tmp log to {}", path.display()))?;
    info!(path = %path.display(), rows = entries.len(), "alert log saved (atomic)");
    Ok(())
}

// =============================================================================
// Field codecs
// =============================================================================

mod two_decimals {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&format!("{v:.2}")),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let raw = String::deserialize(d)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<f64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("bad return {raw:?}: {e}")))
    }
}

mod python_bool {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(match value {
            Some(true) => "True",
            Some(false) => "False",
            None => "",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        let raw = String::deserialize(d)?;
        match raw.trim() {
            "" => Ok(None),
            t if t.eq_ignore_ascii_case("true") => Ok(Some(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Some(false)),
            other => Err(D::Error::custom(format!("bad flag {other:?}"))),
        }
    }
}
