use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const METRIC_MIN: i32 = 0;
pub const METRIC_MAX: i32 = 100;

/// Kind of journal entry, carried on the record itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    #[default]
    #[serde(alias = "daily")]
    Daily,
    #[serde(alias = "sensory")]
    Sensory,
    #[serde(alias = "insight")]
    Insight,
}

impl LogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogKind::Daily => "DAILY",
            LogKind::Sensory => "SENSORY",
            LogKind::Insight => "INSIGHT",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log kind `{0}` (expected daily, sensory or insight)")]
pub struct ParseLogKindError(pub String);

impl FromStr for LogKind {
    type Err = ParseLogKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(LogKind::Daily),
            "sensory" => Ok(LogKind::Sensory),
            "insight" => Ok(LogKind::Insight),
            _ => Err(ParseLogKindError(value.to_string())),
        }
    }
}

/// A journal entry as supplied by the storage layer. The engine only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalRecord {
    pub id: i64,
    #[serde(alias = "date", alias = "createdAt")]
    pub timestamp: String,
    #[serde(default)]
    pub content: String,
    #[serde(alias = "gravity")]
    pub external_pull: i32,
    #[serde(alias = "stability")]
    pub core_stability: i32,
    #[serde(default, alias = "logType")]
    pub kind: LogKind,
}

impl JournalRecord {
    /// External pull clamped to the 0-100 range.
    pub fn gravity(&self) -> i32 {
        self.external_pull.clamp(METRIC_MIN, METRIC_MAX)
    }

    /// Core stability clamped to the 0-100 range.
    pub fn stability(&self) -> i32 {
        self.core_stability.clamp(METRIC_MIN, METRIC_MAX)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub correlation: Option<f64>,
    pub high_segment_avg: Option<f64>,
    pub very_high_segment_avg: Option<f64>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeBucket {
    Dawn,
    Morning,
    Afternoon,
    Night,
}

impl TimeBucket {
    /// Fixed evaluation order; busiest-bucket ties resolve to the earliest entry.
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Dawn,
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Night,
    ];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeBucket::Dawn,
            6..=11 => TimeBucket::Morning,
            12..=17 => TimeBucket::Afternoon,
            _ => TimeBucket::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeBucket::Dawn => "dawn",
            TimeBucket::Morning => "morning",
            TimeBucket::Afternoon => "afternoon",
            TimeBucket::Night => "night",
        }
    }

    pub fn hours(&self) -> &'static str {
        match self {
            TimeBucket::Dawn => "00-06",
            TimeBucket::Morning => "06-12",
            TimeBucket::Afternoon => "12-18",
            TimeBucket::Night => "18-24",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalDistribution {
    pub dawn: usize,
    pub morning: usize,
    pub afternoon: usize,
    pub night: usize,
    pub busiest_bucket: Option<TimeBucket>,
    pub busiest_count: usize,
}

impl TemporalDistribution {
    pub fn count(&self, bucket: TimeBucket) -> usize {
        match bucket {
            TimeBucket::Dawn => self.dawn,
            TimeBucket::Morning => self.morning,
            TimeBucket::Afternoon => self.afternoon,
            TimeBucket::Night => self.night,
        }
    }

    pub(crate) fn increment(&mut self, bucket: TimeBucket) {
        match bucket {
            TimeBucket::Dawn => self.dawn += 1,
            TimeBucket::Morning => self.morning += 1,
            TimeBucket::Afternoon => self.afternoon += 1,
            TimeBucket::Night => self.night += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.dawn + self.morning + self.afternoon + self.night
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFrequency {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryTrend {
    Improving,
    Declining,
    Stable,
}

impl RecoveryTrend {
    pub fn label(&self) -> &'static str {
        match self {
            RecoveryTrend::Improving => "improving",
            RecoveryTrend::Declining => "declining",
            RecoveryTrend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResilienceReport {
    pub average_recovery_days: Option<f64>,
    pub recovery_count: usize,
    pub trend: Option<RecoveryTrend>,
}
