//! Inner Orbit analytics engine.
//!
//! Pure computations over a snapshot of journal records: gravity/stability
//! correlation, time-of-day distribution, high-gravity keywords and recovery
//! time. Nothing here performs I/O; callers load records and render reports.

pub mod config;
pub mod correlation;
pub mod keywords;
pub mod models;
pub mod report;
pub mod resilience;
pub mod temporal;
pub mod timestamp;

pub use config::AnalyticsConfig;
pub use correlation::calculate_correlation;
pub use keywords::extract_keywords;
pub use models::{
    CorrelationReport, JournalRecord, KeywordFrequency, LogKind, RecoveryTrend, ResilienceReport,
    TemporalDistribution, TimeBucket,
};
pub use report::{analyze, analyze_with, build_report, AnalyticsReport};
pub use resilience::calculate_resilience;
pub use temporal::analyze_temporal_patterns;
pub use timestamp::{NormalizedInstant, TimestampError, TimestampFormat, TimestampNormalizer};
