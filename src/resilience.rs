use chrono::{DateTime, FixedOffset};

use crate::models::{JournalRecord, RecoveryTrend, ResilienceReport};
use crate::timestamp::TimestampNormalizer;

pub const LOW_STABILITY: i32 = 30;
pub const RECOVERED_STABILITY: i32 = 50;
/// Recoveries at or below this many days are treated as same-instant noise.
pub const RECOVERY_EPSILON_DAYS: f64 = 1e-6;
/// Minimum completed cycles before a trend is reported.
pub const TREND_MIN_CYCLES: usize = 4;
pub const TREND_TOLERANCE_DAYS: f64 = 0.2;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Elapsed days for every completed low-to-recovered cycle, in chronological order.
pub fn recovery_periods(records: &[JournalRecord], normalizer: &TimestampNormalizer) -> Vec<f64> {
    let mut timeline: Vec<(DateTime<FixedOffset>, i64, i32)> = records
        .iter()
        .map(|record| {
            (
                normalizer.normalize_record(record).instant,
                record.id,
                record.stability(),
            )
        })
        .collect();
    timeline.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut periods = Vec::new();
    let mut low_point: Option<DateTime<FixedOffset>> = None;

    for (instant, _, stability) in timeline {
        if stability <= LOW_STABILITY && low_point.is_none() {
            low_point = Some(instant);
        }

        if let Some(start) = low_point {
            if stability >= RECOVERED_STABILITY {
                let days = (instant - start).num_milliseconds() as f64 / MILLIS_PER_DAY;
                if days > RECOVERY_EPSILON_DAYS {
                    periods.push(days);
                }
                low_point = None;
            }
        }
    }

    periods
}

pub fn calculate_resilience(
    records: &[JournalRecord],
    normalizer: &TimestampNormalizer,
) -> ResilienceReport {
    if records.len() < 2 {
        return ResilienceReport::default();
    }

    let periods = recovery_periods(records, normalizer);
    if periods.is_empty() {
        return ResilienceReport::default();
    }

    let report = ResilienceReport {
        average_recovery_days: Some(mean(&periods)),
        recovery_count: periods.len(),
        trend: trend(&periods),
    };
    tracing::debug!(
        cycles = report.recovery_count,
        average_days = ?report.average_recovery_days,
        trend = ?report.trend,
        "resilience computed"
    );
    report
}

/// Compares the earlier half of the cycles against the later half.
pub fn trend(periods: &[f64]) -> Option<RecoveryTrend> {
    if periods.len() < TREND_MIN_CYCLES {
        return None;
    }

    let (earlier, later) = periods.split_at(periods.len() / 2);
    let improvement = mean(earlier) - mean(later);

    Some(if improvement.abs() > TREND_TOLERANCE_DAYS {
        if improvement > 0.0 {
            RecoveryTrend::Improving
        } else {
            RecoveryTrend::Declining
        }
    } else {
        RecoveryTrend::Stable
    })
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogKind;
    use chrono::{TimeZone, Utc};

    fn normalizer() -> TimestampNormalizer {
        TimestampNormalizer::with_now(
            FixedOffset::east_opt(9 * 3600).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn record(id: i64, timestamp: &str, stability: i32) -> JournalRecord {
        JournalRecord {
            id,
            timestamp: timestamp.to_string(),
            content: String::new(),
            external_pull: 50,
            core_stability: stability,
            kind: LogKind::Daily,
        }
    }

    #[test]
    fn needs_two_records() {
        let report = calculate_resilience(&[record(1, "2024-12-01T09:00:00", 10)], &normalizer());
        assert_eq!(report, ResilienceReport::default());
    }

    #[test]
    fn single_cycle_three_days() {
        let records = vec![
            record(1, "2024-12-01T09:00:00", 20),
            record(2, "2024-12-04T09:00:00", 60),
        ];
        let report = calculate_resilience(&records, &normalizer());
        assert_eq!(report.recovery_count, 1);
        assert!((report.average_recovery_days.unwrap() - 3.0).abs() < 1e-9);
        assert!(report.trend.is_none());
    }

    #[test]
    fn sorts_by_instant_not_input_order() {
        let records = vec![
            record(2, "2024년 12월 3일 21:00", 55),
            record(1, "2024년 12월 2일 09:00", 25),
        ];
        let report = calculate_resilience(&records, &normalizer());
        assert_eq!(report.recovery_count, 1);
        assert!((report.average_recovery_days.unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn low_point_is_the_first_low_record() {
        let records = vec![
            record(1, "2024-12-01T00:00:00", 10),
            record(2, "2024-12-02T00:00:00", 5),
            record(3, "2024-12-03T00:00:00", 40),
            record(4, "2024-12-05T00:00:00", 50),
        ];
        let periods = recovery_periods(&records, &normalizer());
        assert_eq!(periods, vec![4.0]);
    }

    #[test]
    fn same_instant_recovery_is_discarded() {
        let records = vec![
            record(1, "2024-12-01T00:00:00", 10),
            record(2, "2024-12-01T00:00:00", 70),
            record(3, "2024-12-02T00:00:00", 20),
            record(4, "2024-12-04T00:00:00", 90),
        ];
        let periods = recovery_periods(&records, &normalizer());
        assert_eq!(periods, vec![2.0]);
    }

    #[test]
    fn no_completed_cycle_yields_empty_report() {
        let records = vec![
            record(1, "2024-12-01T00:00:00", 10),
            record(2, "2024-12-02T00:00:00", 45),
        ];
        assert_eq!(
            calculate_resilience(&records, &normalizer()),
            ResilienceReport::default()
        );
    }

    #[test]
    fn trend_compares_halves() {
        assert_eq!(trend(&[4.0, 4.0, 1.0, 1.0]), Some(RecoveryTrend::Improving));
        assert_eq!(trend(&[1.0, 1.0, 3.0, 3.0]), Some(RecoveryTrend::Declining));
        assert_eq!(trend(&[2.0, 2.1, 2.0, 2.1]), Some(RecoveryTrend::Stable));
        assert_eq!(trend(&[1.0, 5.0, 9.0]), None);
    }

    #[test]
    fn odd_cycle_count_puts_extra_in_later_half() {
        // earlier = [3, 3], later = [1, 1, 1]
        assert_eq!(trend(&[3.0, 3.0, 1.0, 1.0, 1.0]), Some(RecoveryTrend::Improving));
    }

    #[test]
    fn four_cycles_report_a_trend() {
        let records = vec![
            record(1, "2024-12-01T00:00:00", 10),
            record(2, "2024-12-05T00:00:00", 60),
            record(3, "2024-12-06T00:00:00", 20),
            record(4, "2024-12-10T00:00:00", 60),
            record(5, "2024-12-11T00:00:00", 20),
            record(6, "2024-12-12T00:00:00", 60),
            record(7, "2024-12-13T00:00:00", 20),
            record(8, "2024-12-14T00:00:00", 60),
        ];
        let report = calculate_resilience(&records, &normalizer());
        assert_eq!(report.recovery_count, 4);
        assert_eq!(report.average_recovery_days, Some(2.5));
        assert_eq!(report.trend, Some(RecoveryTrend::Improving));
    }
}
