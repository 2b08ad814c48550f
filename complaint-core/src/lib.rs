//! Core data model for parsed chief complaints.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Canonical unit of an elapsed-time phrase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DurationUnit {
    /// Chinese label used when rendering `normalized_text`.
    pub fn label(self) -> &'static str {
        match self {
            DurationUnit::Minute => "分钟",
            DurationUnit::Hour => "小时",
            DurationUnit::Day => "天",
            DurationUnit::Week => "周",
            DurationUnit::Month => "个月",
            DurationUnit::Year => "年",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Minute => "minute",
            DurationUnit::Hour => "hour",
            DurationUnit::Day => "day",
            DurationUnit::Week => "week",
            DurationUnit::Month => "month",
            DurationUnit::Year => "year",
        }
    }

    /// Approximate length of one unit in seconds (month = 30 days, year = 365 days).
    pub fn approximate_seconds(self) -> i64 {
        const MINUTE: i64 = 60;
        const HOUR: i64 = 60 * MINUTE;
        const DAY: i64 = 24 * HOUR;
        match self {
            DurationUnit::Minute => MINUTE,
            DurationUnit::Hour => HOUR,
            DurationUnit::Day => DAY,
            DurationUnit::Week => 7 * DAY,
            DurationUnit::Month => 30 * DAY,
            DurationUnit::Year => 365 * DAY,
        }
    }
}

impl fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of a duration magnitude. `min <= max` always holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "RangeBounds")]
pub struct DurationRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RangeBounds {
    min: f64,
    max: f64,
}

impl From<RangeBounds> for DurationRange {
    fn from(bounds: RangeBounds) -> Self {
        DurationRange::new(bounds.min, bounds.max)
    }
}

impl DurationRange {
    /// Build a range, swapping the bounds when supplied out of order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Magnitude of a duration: a single number or a range, never both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum DurationValue {
    Single(f64),
    Range(DurationRange),
}

impl DurationValue {
    pub fn range(a: f64, b: f64) -> Self {
        DurationValue::Range(DurationRange::new(a, b))
    }

    pub fn is_range(&self) -> bool {
        matches!(self, DurationValue::Range(_))
    }

    /// Largest magnitude covered by the value.
    pub fn upper(&self) -> f64 {
        match self {
            DurationValue::Single(value) => *value,
            DurationValue::Range(range) => range.max,
        }
    }
}

impl fmt::Display for DurationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationValue::Single(value) => f.write_str(&format_numeric(*value)),
            DurationValue::Range(range) => write!(
                f,
                "{}-{}",
                format_numeric(range.min),
                format_numeric(range.max)
            ),
        }
    }
}

/// Duration recognised in a complaint. The three parts only exist together.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDuration {
    pub value: DurationValue,
    pub unit: DurationUnit,
    /// Matched span exactly as it appeared in the normalized input.
    pub raw: String,
}

impl ExtractedDuration {
    /// Display form such as `3天` or `2-3天`.
    pub fn display_text(&self) -> String {
        format!("{}{}", self.value, self.unit.label())
    }

    /// Elapsed time covered by the duration, using the upper bound of ranges.
    pub fn approximate_span(&self) -> Option<TimeDelta> {
        let seconds = self.value.upper() * self.unit.approximate_seconds() as f64;
        if !seconds.is_finite() || seconds < 0.0 || seconds > i64::MAX as f64 {
            return None;
        }
        TimeDelta::try_seconds(seconds.round() as i64)
    }

    /// Onset timestamp implied by the duration relative to `reference`.
    pub fn estimated_onset(&self, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.approximate_span()
            .and_then(|span| reference.checked_sub_signed(span))
    }
}

/// Reason a parse is incomplete.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FailureReason {
    #[serde(rename = "空文本")]
    EmptyText,
    #[serde(rename = "未识别到持续时间")]
    NoDuration,
    #[serde(rename = "主诉核心描述为空")]
    EmptyComplaint,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::EmptyText => "空文本",
            FailureReason::NoDuration => "未识别到持续时间",
            FailureReason::EmptyComplaint => "主诉核心描述为空",
        }
    }

    /// HTTP status a host layer should answer with for this outcome.
    pub fn status_code(self) -> u16 {
        match self {
            FailureReason::EmptyText => 400,
            FailureReason::NoDuration | FailureReason::EmptyComplaint => 200,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured chief complaint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(into = "ParseResultRecord", from = "ParseResultRecord")]
pub struct ParseResult {
    pub complaint_text: String,
    pub duration: Option<ExtractedDuration>,
    pub normalized_text: String,
    pub confidence: f64,
    pub failure_reason: Option<FailureReason>,
}

impl ParseResult {
    /// Result for blank input.
    pub fn empty() -> Self {
        Self {
            complaint_text: String::new(),
            duration: None,
            normalized_text: String::new(),
            confidence: 0.0,
            failure_reason: Some(FailureReason::EmptyText),
        }
    }

    /// True when both a complaint and a duration were recognised.
    pub fn is_complete(&self) -> bool {
        self.failure_reason.is_none()
    }

    pub fn duration_value(&self) -> Option<DurationValue> {
        self.duration.as_ref().map(|duration| duration.value)
    }

    pub fn duration_unit(&self) -> Option<DurationUnit> {
        self.duration.as_ref().map(|duration| duration.unit)
    }

    pub fn duration_raw(&self) -> Option<&str> {
        self.duration.as_ref().map(|duration| duration.raw.as_str())
    }
}

/// Flat wire form of [`ParseResult`].
#[derive(Serialize, Deserialize)]
struct ParseResultRecord {
    complaint_text: String,
    duration_value: Option<DurationValue>,
    duration_unit: Option<DurationUnit>,
    duration_raw: Option<String>,
    normalized_text: String,
    confidence: f64,
    failure_reason: Option<FailureReason>,
}

impl From<ParseResult> for ParseResultRecord {
    fn from(result: ParseResult) -> Self {
        let (duration_value, duration_unit, duration_raw) = match result.duration {
            Some(duration) => (Some(duration.value), Some(duration.unit), Some(duration.raw)),
            None => (None, None, None),
        };
        Self {
            complaint_text: result.complaint_text,
            duration_value,
            duration_unit,
            duration_raw,
            normalized_text: result.normalized_text,
            confidence: result.confidence,
            failure_reason: result.failure_reason,
        }
    }
}

impl From<ParseResultRecord> for ParseResult {
    fn from(record: ParseResultRecord) -> Self {
        let duration = match (record.duration_value, record.duration_unit, record.duration_raw) {
            (Some(value), Some(unit), Some(raw)) => Some(ExtractedDuration { value, unit, raw }),
            _ => None,
        };
        Self {
            complaint_text: record.complaint_text,
            duration,
            normalized_text: record.normalized_text,
            confidence: record.confidence,
            failure_reason: record.failure_reason,
        }
    }
}

/// Dictionaries supplied with every parse call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParseOptions {
    /// Informal phrase -> canonical phrase.
    #[serde(default)]
    pub synonyms: BTreeMap<String, String>,
    /// Canonical symptom names.
    #[serde(default, alias = "knownSymptoms")]
    pub known_symptoms: BTreeSet<String>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_symptoms
            .extend(symptoms.into_iter().map(Into::into));
        self
    }

    pub fn with_synonym(mut self, phrase: impl Into<String>, canonical: impl Into<String>) -> Self {
        self.synonyms.insert(phrase.into(), canonical.into());
        self
    }

    /// Load dictionaries from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ComplaintError> {
        serde_json::from_str(json).map_err(|err| ComplaintError::Dictionary(err.to_string()))
    }

    /// Merge another dictionary document into this one; later entries win.
    pub fn merge(&mut self, other: ParseOptions) {
        self.synonyms.extend(other.synonyms);
        self.known_symptoms.extend(other.known_symptoms);
    }
}

/// Errors raised at the boundaries around the parser.
#[derive(Debug, thiserror::Error)]
pub enum ComplaintError {
    #[error("complaint text is empty")]
    EmptyText,
    #[error("request has no `text` or `complaint` field")]
    MissingText,
    #[error("invalid dictionary: {0}")]
    Dictionary(String),
    #[error("could not read input: {0}")]
    Parse(String),
}

/// Render a number without a trailing `.0` for whole values.
pub fn format_numeric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}
