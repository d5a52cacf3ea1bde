//! Pure aggregation functions over series snapshots.
//!
//! Everything here is stateless and I/O free: derived views are computed
//! fresh on every query and never persisted.

use crate::model::{Sample, SampleStatus, StatusLabel};

/// Uptime percentage over recorded points only.
///
/// `Unknown` buckets are excluded from both numerator and denominator: an
/// unmonitored period neither helps nor hurts the score. With no recorded
/// points at all the result is 100.0 (nothing observed yet is presumed
/// healthy).
pub fn uptime_percentage(samples: &[Sample]) -> f64 {
    uptime_percentage_with_default(samples, 100.0)
}

/// Like [`uptime_percentage`] but with a caller-chosen no-data default.
pub fn uptime_percentage_with_default(samples: &[Sample], no_data_default: f64) -> f64 {
    let mut recorded = 0u64;
    let mut up = 0u64;

    for s in samples {
        match s.status {
            SampleStatus::Unknown => {}
            SampleStatus::Up => {
                recorded += 1;
                up += 1;
            }
            SampleStatus::Down => recorded += 1,
        }
    }

    if recorded == 0 {
        no_data_default
    } else {
        100.0 * up as f64 / recorded as f64
    }
}

/// Classify an uptime percentage into a status label.
///
/// Tier lower bounds are inclusive: exactly 99.9 is Operational.
pub fn classify(percentage: f64) -> StatusLabel {
    if percentage >= 99.9 {
        StatusLabel::Operational
    } else if percentage >= 99.0 {
        StatusLabel::Degraded
    } else if percentage >= 95.0 {
        StatusLabel::PartialOutage
    } else {
        StatusLabel::MajorOutage
    }
}

/// Render a duration in seconds as `"{d}d {h}h {m}m"`, dropping leading
/// zero-valued units. Sub-minute durations render as `"0m"`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Collapse a series into exactly `bar_count` evenly spaced buckets spanning
/// the `window_ms` ending at `window_end_ms`.
///
/// A bar with no recorded sample is Unknown; a bar covering at least one
/// Down sample is Down (down dominates up within a merged bar); otherwise
/// Up. Bars are stamped at their own start time.
pub fn normalize_to_fixed_bars(
    samples: &[Sample],
    bar_count: usize,
    window_end_ms: i64,
    window_ms: i64,
) -> Vec<Sample> {
    if bar_count == 0 || window_ms <= 0 {
        return Vec::new();
    }

    let start = window_end_ms - window_ms;
    let mut bars = Vec::with_capacity(bar_count);

    for i in 0..bar_count {
        // Integer boundary arithmetic avoids cumulative rounding drift.
        let bar_start = start + (i as i64 * window_ms) / bar_count as i64;
        let bar_end = start + ((i as i64 + 1) * window_ms) / bar_count as i64;

        let mut status = SampleStatus::Unknown;
        for s in samples {
            if s.status == SampleStatus::Unknown
                || s.timestamp_ms < bar_start
                || s.timestamp_ms >= bar_end
            {
                continue;
            }
            if s.status == SampleStatus::Down {
                status = SampleStatus::Down;
                break;
            }
            status = SampleStatus::Up;
        }

        bars.push(Sample::new(bar_start, status));
    }

    bars
}
