use chrono::{FixedOffset, Offset, Utc};

pub const DEFAULT_GRAVITY_THRESHOLD: i32 = 70;
/// Localized timestamps are written in Korea Standard Time.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Minimum external pull for a record to feed keyword extraction.
    pub gravity_threshold: i32,
    /// Offset used for wall-clock timestamps and hour-of-day bucketing.
    pub utc_offset: FixedOffset,
}

impl AnalyticsConfig {
    /// Builds a config from an hour offset, rejecting offsets outside +/-23h.
    pub fn new(gravity_threshold: i32, utc_offset_hours: i32) -> Option<Self> {
        let utc_offset = FixedOffset::east_opt(utc_offset_hours.checked_mul(3600)?)?;
        Some(Self {
            gravity_threshold,
            utc_offset,
        })
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            gravity_threshold: DEFAULT_GRAVITY_THRESHOLD,
            utc_offset: FixedOffset::east_opt(DEFAULT_UTC_OFFSET_HOURS * 3600)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_seoul_offset() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.gravity_threshold, 70);
        assert_eq!(config.utc_offset.local_minus_utc(), 9 * 3600);
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(AnalyticsConfig::new(70, 24).is_none());
        assert!(AnalyticsConfig::new(70, -5).is_some());
    }
}
