//! Timestamp normalization.
//!
//! Records arrive with one of two encodings: a machine-readable date-time
//! (`2024-12-05T09:18:00`, RFC 3339, ...) or a localized long-form string
//! such as `2024년 12월 5일 09:18`. Both map to a single comparable instant
//! expressed in the configured offset.

use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::models::JournalRecord;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Number of decimal runs a localized timestamp must contain:
/// year, month, day, hour, minute.
const LOCALIZED_FIELDS: usize = 5;

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}").unwrap())
}

fn digit_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("`{0}` looks like an ISO date but is not a valid date-time")]
    InvalidIso(String),
    #[error("expected 5 numeric fields (year, month, day, hour, minute), found {found}")]
    TooFewFields { found: usize },
    #[error("numeric field `{0}` is too large")]
    FieldOverflow(String),
    #[error("{year}-{month}-{day} {hour}:{minute} is not a valid calendar date-time")]
    OutOfRange {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

/// The two timestamp encodings, selected by a structural test on the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampFormat {
    Iso,
    Localized,
}

impl TimestampFormat {
    pub fn detect(raw: &str) -> Self {
        if iso_date_pattern().is_match(raw) {
            TimestampFormat::Iso
        } else {
            TimestampFormat::Localized
        }
    }

    pub fn parse(
        self,
        raw: &str,
        offset: FixedOffset,
    ) -> Result<DateTime<FixedOffset>, TimestampError> {
        match self {
            TimestampFormat::Iso => parse_iso(raw, offset),
            TimestampFormat::Localized => parse_localized(raw, offset),
        }
    }
}

fn localize(
    naive: NaiveDateTime,
    offset: FixedOffset,
    raw: &str,
) -> Result<DateTime<FixedOffset>, TimestampError> {
    offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimestampError::InvalidIso(raw.to_string()))
}

fn parse_iso(raw: &str, offset: FixedOffset) -> Result<DateTime<FixedOffset>, TimestampError> {
    let trimmed = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&offset));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return localize(naive, offset, raw);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return localize(date.and_time(NaiveTime::MIN), offset, raw);
    }

    Err(TimestampError::InvalidIso(raw.to_string()))
}

fn parse_localized(
    raw: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, TimestampError> {
    let runs: Vec<&str> = digit_runs()
        .find_iter(raw)
        .map(|run| run.as_str())
        .take(LOCALIZED_FIELDS)
        .collect();

    if runs.len() < LOCALIZED_FIELDS {
        return Err(TimestampError::TooFewFields { found: runs.len() });
    }

    let field = |run: &str| {
        run.parse::<u32>()
            .map_err(|_| TimestampError::FieldOverflow(run.to_string()))
    };
    let year = runs[0]
        .parse::<i32>()
        .map_err(|_| TimestampError::FieldOverflow(runs[0].to_string()))?;
    let month = field(runs[1])?;
    let day = field(runs[2])?;
    let hour = field(runs[3])?;
    let minute = field(runs[4])?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or(TimestampError::OutOfRange {
            year,
            month,
            day,
            hour,
            minute,
        })?;

    localize(naive, offset, raw)
}

/// Result of normalizing one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedInstant {
    pub instant: DateTime<FixedOffset>,
    /// Encoding that produced the instant, `None` when the fallback was used.
    pub format: Option<TimestampFormat>,
}

impl NormalizedInstant {
    pub fn is_fallback(&self) -> bool {
        self.format.is_none()
    }
}

/// Normalizes raw timestamps into instants in one fixed offset.
///
/// Unparsable values never fail: they resolve to the `now` captured when the
/// normalizer was built, so every fallback in one run shares an instant.
#[derive(Debug, Clone, Copy)]
pub struct TimestampNormalizer {
    offset: FixedOffset,
    now: DateTime<FixedOffset>,
}

impl TimestampNormalizer {
    pub fn new(offset: FixedOffset) -> Self {
        Self::with_now(offset, Utc::now())
    }

    pub fn with_now(offset: FixedOffset, now: DateTime<Utc>) -> Self {
        Self {
            offset,
            now: now.with_timezone(&offset),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now
    }

    /// Parses `raw` with the detected encoding, surfacing the error.
    pub fn try_parse(&self, raw: &str) -> Result<NormalizedInstant, TimestampError> {
        let format = TimestampFormat::detect(raw);
        let instant = format.parse(raw, self.offset)?;
        Ok(NormalizedInstant {
            instant,
            format: Some(format),
        })
    }

    pub fn normalize(&self, raw: &str) -> NormalizedInstant {
        self.try_parse(raw).unwrap_or_else(|err| {
            tracing::warn!(raw, error = %err, "unparsable timestamp, using current time");
            self.fallback()
        })
    }

    pub fn normalize_record(&self, record: &JournalRecord) -> NormalizedInstant {
        self.try_parse(&record.timestamp).unwrap_or_else(|err| {
            tracing::warn!(
                record_id = record.id,
                raw = %record.timestamp,
                error = %err,
                "unparsable timestamp, using current time"
            );
            self.fallback()
        })
    }

    fn fallback(&self) -> NormalizedInstant {
        NormalizedInstant {
            instant: self.now,
            format: None,
        }
    }
}
