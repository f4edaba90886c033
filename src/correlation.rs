use crate::models::{CorrelationReport, JournalRecord};

pub const HIGH_GRAVITY: i32 = 60;
pub const VERY_HIGH_GRAVITY: i32 = 80;

pub fn calculate_correlation(records: &[JournalRecord]) -> CorrelationReport {
    if records.len() < 2 {
        return CorrelationReport::default();
    }

    let correlation = pearson(records);
    let high_segment_avg = segment_average(records, HIGH_GRAVITY);
    let very_high_segment_avg = segment_average(records, VERY_HIGH_GRAVITY);

    let mut insights = Vec::new();
    if let Some(avg) = very_high_segment_avg {
        insights.push(format!(
            "When Gravity is {VERY_HIGH_GRAVITY}% or higher, your Stability drops to an average of {}%.",
            avg.round()
        ));
    } else if let Some(avg) = high_segment_avg {
        insights.push(format!(
            "When Gravity is {HIGH_GRAVITY}% or higher, your Stability averages {}%.",
            avg.round()
        ));
    }

    if correlation.is_finite() {
        insights.push(format!(
            "Found a {} {} correlation between Gravity and Stability (r={:.2}).",
            strength_label(correlation),
            direction_label(correlation),
            correlation
        ));
    }

    tracing::debug!(
        records = records.len(),
        correlation,
        ?high_segment_avg,
        ?very_high_segment_avg,
        "correlation computed"
    );

    CorrelationReport {
        correlation: correlation.is_finite().then_some(correlation),
        high_segment_avg,
        very_high_segment_avg,
        insights,
    }
}

/// Pearson coefficient of gravity against stability. Zero variance in either
/// series yields 0.
fn pearson(records: &[JournalRecord]) -> f64 {
    let n = records.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2, mut sum_y2) = (0.0, 0.0, 0.0, 0.0, 0.0);

    for record in records {
        let x = record.gravity() as f64;
        let y = record.stability() as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
        sum_y2 += y * y;
    }

    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Mean stability of records whose gravity is at least `min_gravity`.
fn segment_average(records: &[JournalRecord], min_gravity: i32) -> Option<f64> {
    let (count, total) = records
        .iter()
        .filter(|record| record.gravity() >= min_gravity)
        .fold((0usize, 0i64), |(count, total), record| {
            (count + 1, total + record.stability() as i64)
        });

    if count == 0 {
        None
    } else {
        Some(total as f64 / count as f64)
    }
}

fn strength_label(correlation: f64) -> &'static str {
    let magnitude = correlation.abs();
    if magnitude > 0.7 {
        "strong"
    } else if magnitude > 0.4 {
        "moderate"
    } else {
        "weak"
    }
}

fn direction_label(correlation: f64) -> &'static str {
    if correlation < 0.0 {
        "negative"
    } else {
        "positive"
    }
}
