use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

pub const UNKNOWN_SOURCE: &str = "unknown";

/// One source's report of one fixture, exactly as the scraper produced it.
///
/// Every field except `source_tag` is optional: scrapers routinely drop
/// fields, and a missing field must fail validation for its group rather
/// than abort deserialization of the whole batch. Numbers and booleans are
/// read as their text; null, arrays and objects count as missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(
        default,
        alias = "home_team",
        alias = "home",
        deserialize_with = "lenient_text"
    )]
    pub subject_a: Option<String>,
    #[serde(
        default,
        alias = "away_team",
        alias = "away",
        deserialize_with = "lenient_text"
    )]
    pub subject_b: Option<String>,
    #[serde(
        default,
        alias = "date",
        alias = "utc_time",
        alias = "kickoff",
        deserialize_with = "lenient_text"
    )]
    pub event_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(
        default = "unknown_source",
        alias = "source",
        deserialize_with = "lenient_source"
    )]
    pub source_tag: String,
}

fn unknown_source() -> String {
    UNKNOWN_SOURCE.to_string()
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(scalar_text)
}

fn lenient_source<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Value::deserialize(deserializer).map(scalar_text)?;
    Ok(tag
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(unknown_source))
}

/// Parse a scraped batch: a JSON array of record objects.
///
/// Only a document that is not an array is an error. An element that cannot
/// be read as a record is logged and skipped so the rest of the batch still
/// reconciles.
pub fn parse_batch_json(raw: &str) -> Result<Vec<RawRecord>> {
    let items: Vec<Value> = serde_json::from_str(raw).context("batch must be a JSON array")?;
    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(item) {
            Ok(rec) => records.push(rec),
            Err(err) => warn!(index = idx, error = %err, "skipping unreadable batch element"),
        }
    }
    Ok(records)
}

impl RawRecord {
    pub fn new(
        subject_a: impl Into<String>,
        subject_b: impl Into<String>,
        event_date: impl Into<String>,
        status: impl Into<String>,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            subject_a: Some(subject_a.into()),
            subject_b: Some(subject_b.into()),
            event_date: Some(event_date.into()),
            status: Some(status.into()),
            source_tag: source_tag.into(),
        }
    }

    pub fn subject_a(&self) -> &str {
        self.subject_a.as_deref().unwrap_or_default()
    }

    pub fn subject_b(&self) -> &str {
        self.subject_b.as_deref().unwrap_or_default()
    }

    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    /// Kickoff in UTC, or `None` when the date is missing or unparseable.
    pub fn kickoff(&self) -> Option<NaiveDateTime> {
        self.event_date.as_deref().and_then(parse_kickoff)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        self.kickoff().map(|k| k.date())
    }
}

/// Parse the date formats scrapers are known to emit. Offsets are converted to
/// UTC; naive values are assumed to already be UTC.
pub fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Source-independent classification of a free-text status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    Scheduled,
    Live,
    Postponed,
    Cancelled,
    Abandoned,
    Finished,
    Unrecognized,
}

impl StatusClass {
    /// Statuses that can corroborate an upcoming or ongoing fixture.
    pub fn is_valid(self) -> bool {
        matches!(self, StatusClass::Scheduled | StatusClass::Live)
    }

    pub fn is_excluded(self) -> bool {
        matches!(
            self,
            StatusClass::Postponed
                | StatusClass::Cancelled
                | StatusClass::Abandoned
                | StatusClass::Finished
        )
    }

    pub fn not_started(self) -> bool {
        self == StatusClass::Scheduled
    }
}
