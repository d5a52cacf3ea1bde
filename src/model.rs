//! Core model types shared across the store, scheduler, and hub.

use serde::{Deserialize, Serialize};

/// What kind of entity a target represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Container,
    Node,
    System,
}

/// A monitored target configuration.
///
/// Immutable once registered; re-registering the same `id` replaces the
/// configuration atomically without discarding recorded history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Unique identifier within the registry.
    pub id: String,
    pub kind: TargetKind,
    /// Endpoint the prober should contact (URL, host, or metrics source).
    pub address: String,
    pub poll_interval_ms: u64,
    /// Per-poll budget; must be strictly less than `poll_interval_ms`.
    pub timeout_ms: u64,
}

impl Default for Target {
    fn default() -> Self {
        Self {
            id: String::new(),
            kind: TargetKind::Container,
            address: String::new(),
            poll_interval_ms: 30_000,
            timeout_ms: 5_000,
        }
    }
}

/// Three-valued health status of one observation.
///
/// `Unknown` marks a bucket where no probe completed (unmonitored or the
/// probe itself failed), which is distinct from an observed `Down`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStatus {
    Unknown,
    Down,
    Up,
}

impl SampleStatus {
    /// Signed representation: -1 unknown, 0 down, 1 up.
    pub fn as_i8(self) -> i8 {
        match self {
            SampleStatus::Unknown => -1,
            SampleStatus::Down => 0,
            SampleStatus::Up => 1,
        }
    }
}

/// One timestamped observation. Immutable once stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds since the Unix epoch, stamped at poll start.
    pub timestamp_ms: i64,
    pub status: SampleStatus,
    /// Present only for graded probes.
    pub latency_ms: Option<f64>,
}

impl Sample {
    pub fn new(timestamp_ms: i64, status: SampleStatus) -> Self {
        Self {
            timestamp_ms,
            status,
            latency_ms: None,
        }
    }

    /// Placeholder for a bucket with no recorded observation.
    pub fn unknown(timestamp_ms: i64) -> Self {
        Self::new(timestamp_ms, SampleStatus::Unknown)
    }
}

/// Notification that a target's series changed.
///
/// Carries the accepted sample for convenience; consumers that fall behind
/// may miss events and should re-query the series on wake.
#[derive(Debug, Clone)]
pub struct SeriesChangeEvent {
    pub target_id: String,
    pub sample: Sample,
}

/// Threshold-derived status classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusLabel {
    Operational,
    Degraded,
    PartialOutage,
    MajorOutage,
}

/// Derived summary of a series, computed fresh on every query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateView {
    pub uptime_percentage: f64,
    pub status_label: StatusLabel,
    /// Human-readable span of recorded data, e.g. "1d 4h 12m".
    pub formatted_duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_signed_repr() {
        assert_eq!(SampleStatus::Unknown.as_i8(), -1);
        assert_eq!(SampleStatus::Down.as_i8(), 0);
        assert_eq!(SampleStatus::Up.as_i8(), 1);
    }

    #[test]
    fn test_default_target() {
        let t = Target::default();
        assert!(t.timeout_ms < t.poll_interval_ms);
    }
}
