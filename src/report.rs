use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::config::AnalyticsConfig;
use crate::correlation::calculate_correlation;
use crate::keywords::extract_keywords;
use crate::models::{
    CorrelationReport, JournalRecord, KeywordFrequency, ResilienceReport, TemporalDistribution,
    TimeBucket,
};
use crate::resilience::calculate_resilience;
use crate::temporal::analyze_temporal_patterns;
use crate::timestamp::TimestampNormalizer;

/// All four analyses over one snapshot of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub record_count: usize,
    /// Records whose timestamp fell back to the current time.
    pub unparsed_timestamps: usize,
    pub gravity_threshold: i32,
    pub correlation: CorrelationReport,
    pub temporal: TemporalDistribution,
    pub keywords: Vec<KeywordFrequency>,
    pub resilience: ResilienceReport,
}

pub fn analyze(records: &[JournalRecord], config: &AnalyticsConfig) -> AnalyticsReport {
    analyze_with(records, config, &TimestampNormalizer::new(config.utc_offset))
}

pub fn analyze_with(
    records: &[JournalRecord],
    config: &AnalyticsConfig,
    normalizer: &TimestampNormalizer,
) -> AnalyticsReport {
    let unparsed_timestamps = records
        .iter()
        .filter(|record| normalizer.try_parse(&record.timestamp).is_err())
        .count();

    if unparsed_timestamps > 0 {
        tracing::warn!(
            unparsed = unparsed_timestamps,
            total = records.len(),
            "some timestamps could not be parsed; ordering may be off"
        );
    }

    AnalyticsReport {
        record_count: records.len(),
        unparsed_timestamps,
        gravity_threshold: config.gravity_threshold,
        correlation: calculate_correlation(records),
        temporal: analyze_temporal_patterns(records, normalizer),
        keywords: extract_keywords(records, config.gravity_threshold),
        resilience: calculate_resilience(records, normalizer),
    }
}

pub fn build_report(scope: Option<&str>, report: &AnalyticsReport) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("all entries");

    let _ = writeln!(output, "# Inner Orbit Analytics Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} entries)",
        scope_label, report.record_count
    );
    if report.unparsed_timestamps > 0 {
        let _ = writeln!(
            output,
            "Note: {} entries had unreadable timestamps and were placed at the current time.",
            report.unparsed_timestamps
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Gravity vs Stability");
    match report.correlation.correlation {
        Some(r) => {
            let _ = writeln!(output, "- Correlation: r = {:.2}", r);
        }
        None => {
            let _ = writeln!(output, "Not enough entries to correlate (need at least 2).");
        }
    }
    if let Some(avg) = report.correlation.high_segment_avg {
        let _ = writeln!(output, "- Avg stability at gravity >= 60: {:.1}", avg);
    }
    if let Some(avg) = report.correlation.very_high_segment_avg {
        let _ = writeln!(output, "- Avg stability at gravity >= 80: {:.1}", avg);
    }
    for insight in report.correlation.insights.iter() {
        let _ = writeln!(output, "- {}", insight);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Time of Day");
    if report.temporal.total() == 0 {
        let _ = writeln!(output, "No entries recorded.");
    } else {
        for bucket in TimeBucket::ALL {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                bucket.label(),
                bucket.hours(),
                report.temporal.count(bucket)
            );
        }
        if let Some(bucket) = report.temporal.busiest_bucket {
            let _ = writeln!(
                output,
                "Busiest period: {} with {} entries",
                bucket.label(),
                report.temporal.busiest_count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Keywords at Gravity >= {}",
        report.gravity_threshold
    );
    if report.keywords.is_empty() {
        let _ = writeln!(output, "No high-gravity entries in this window.");
    } else {
        for keyword in report.keywords.iter() {
            let _ = writeln!(output, "- {}: {}", keyword.word, keyword.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Resilience");
    match report.resilience.average_recovery_days {
        Some(days) => {
            let _ = writeln!(
                output,
                "- Average recovery: {:.1} days across {} cycles",
                days, report.resilience.recovery_count
            );
            match report.resilience.trend {
                Some(trend) => {
                    let _ = writeln!(output, "- Trend: {}", trend.label());
                }
                None => {
                    let _ = writeln!(output, "- Trend: needs at least 4 cycles");
                }
            }
        }
        None => {
            let _ = writeln!(output, "No completed recovery cycles yet.");
        }
    }

    output
}
