//! In-memory series store: one bounded ring buffer per target.

mod series;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::MonitorError;
use crate::hub::SubscriptionHub;
use crate::model::{Sample, SeriesChangeEvent};
use series::Series;

/// Thread-safe store of per-target sample series.
///
/// Appends and queries are pure in-memory operations guarded by short-held
/// locks; series for different targets never contend with each other.
pub struct SeriesStore {
    bucket_ms: i64,
    capacity: usize,
    hub: Arc<SubscriptionHub>,
    series: RwLock<HashMap<String, Arc<Mutex<Series>>>>,
}

impl SeriesStore {
    /// Create a store keeping `window_ms` of history in `bucket_ms` buckets.
    ///
    /// Capacity is `window_ms / bucket_ms` rounded up.
    pub fn new(window_ms: i64, bucket_ms: i64, hub: Arc<SubscriptionHub>) -> Self {
        let bucket_ms = bucket_ms.max(1);
        let capacity = ((window_ms.max(1) + bucket_ms - 1) / bucket_ms) as usize;
        Self {
            bucket_ms,
            capacity,
            hub,
            series: RwLock::new(HashMap::new()),
        }
    }

    pub fn bucket_ms(&self) -> i64 {
        self.bucket_ms
    }

    fn series_for(&self, id: &str) -> Option<Arc<Mutex<Series>>> {
        self.series.read().unwrap().get(id).cloned()
    }

    /// Append a sample to the bucket covering its timestamp.
    ///
    /// Creates the series lazily on first append for an id. Within a bucket
    /// the newer-timestamped sample wins. Never fails; subscribers of `id`
    /// are notified on every accepted write.
    pub fn append(&self, id: &str, sample: Sample) {
        let series = match self.series_for(id) {
            Some(s) => s,
            None => {
                let mut map = self.series.write().unwrap();
                map.entry(id.to_string())
                    .or_insert_with(|| {
                        Arc::new(Mutex::new(Series::new(self.bucket_ms, self.capacity)))
                    })
                    .clone()
            }
        };

        let changed = series.lock().unwrap().append(sample);
        if changed {
            self.hub.publish(SeriesChangeEvent {
                target_id: id.to_string(),
                sample,
            });
        }
    }

    /// Buckets overlapping `[from_ms, to_ms)` in chronological order, with
    /// unrecorded buckets synthesized as `Unknown` placeholders.
    pub fn range(&self, id: &str, from_ms: i64, to_ms: i64) -> Result<Vec<Sample>, MonitorError> {
        let series = self
            .series_for(id)
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))?;
        let samples = series.lock().unwrap().range(from_ms, to_ms);
        Ok(samples)
    }

    /// Most recent recorded sample for `id`.
    pub fn latest(&self, id: &str) -> Result<Sample, MonitorError> {
        let series = self
            .series_for(id)
            .ok_or_else(|| MonitorError::NotFound(id.to_string()))?;
        let latest = series.lock().unwrap().latest();
        latest.ok_or_else(|| MonitorError::NotFound(id.to_string()))
    }

    /// Drop the series for `id`, if any. Returns true if one existed.
    pub fn remove(&self, id: &str) -> bool {
        self.series.write().unwrap().remove(id).is_some()
    }
}
