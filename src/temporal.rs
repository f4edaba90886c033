use chrono::Timelike;

use crate::models::{JournalRecord, TemporalDistribution, TimeBucket};
use crate::timestamp::TimestampNormalizer;

/// Counts records per time-of-day bucket using each record's local hour.
pub fn analyze_temporal_patterns(
    records: &[JournalRecord],
    normalizer: &TimestampNormalizer,
) -> TemporalDistribution {
    let mut distribution = TemporalDistribution::default();

    for record in records {
        let hour = normalizer.normalize_record(record).instant.hour();
        distribution.increment(TimeBucket::from_hour(hour));
    }

    // Strictly greater: ties keep the bucket seen first.
    for bucket in TimeBucket::ALL {
        let count = distribution.count(bucket);
        if count > distribution.busiest_count {
            distribution.busiest_bucket = Some(bucket);
            distribution.busiest_count = count;
        }
    }

    distribution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogKind;
    use chrono::{FixedOffset, TimeZone, Utc};

    fn normalizer() -> TimestampNormalizer {
        TimestampNormalizer::with_now(
            FixedOffset::east_opt(9 * 3600).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn at_hour(id: i64, hour: u32) -> JournalRecord {
        JournalRecord {
            id,
            timestamp: format!("2024년 12월 5일 {hour:02}:30"),
            content: String::new(),
            external_pull: 50,
            core_stability: 50,
            kind: LogKind::Daily,
        }
    }

    #[test]
    fn empty_collection_has_no_busiest_bucket() {
        let distribution = analyze_temporal_patterns(&[], &normalizer());
        assert_eq!(distribution, TemporalDistribution::default());
        assert!(distribution.busiest_bucket.is_none());
    }

    #[test]
    fn buckets_records_by_hour() {
        let records = vec![at_hour(1, 2), at_hour(2, 2), at_hour(3, 14), at_hour(4, 23)];
        let distribution = analyze_temporal_patterns(&records, &normalizer());
        assert_eq!(distribution.dawn, 2);
        assert_eq!(distribution.morning, 0);
        assert_eq!(distribution.afternoon, 1);
        assert_eq!(distribution.night, 1);
        assert_eq!(distribution.busiest_bucket, Some(TimeBucket::Dawn));
        assert_eq!(distribution.busiest_count, 2);
    }

    #[test]
    fn ties_resolve_to_first_bucket_in_order() {
        let records = vec![at_hour(1, 20), at_hour(2, 8)];
        let distribution = analyze_temporal_patterns(&records, &normalizer());
        assert_eq!(distribution.busiest_bucket, Some(TimeBucket::Morning));
        assert_eq!(distribution.busiest_count, 1);
    }

    #[test]
    fn iso_timestamps_use_configured_offset() {
        let mut record = at_hour(1, 0);
        record.timestamp = "2024-12-05T13:00:00Z".to_string();
        let distribution = analyze_temporal_patterns(&[record], &normalizer());
        assert_eq!(distribution.night, 1);
    }
}
