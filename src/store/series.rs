//! Fixed-capacity ring buffer of bucketed samples for one target.

use std::collections::VecDeque;

use crate::model::Sample;

/// Bounded rolling history of samples, one slot per fixed-width time bucket.
///
/// Slots are contiguous in bucket index: `buckets[i]` covers the bucket at
/// index `head + i`. Gaps between appends are stored as empty slots so range
/// queries stay O(width) and eviction stays O(1) amortized.
#[derive(Debug)]
pub(crate) struct Series {
    bucket_ms: i64,
    capacity: usize,
    head: i64,
    buckets: VecDeque<Option<Sample>>,
}

impl Series {
    pub(crate) fn new(bucket_ms: i64, capacity: usize) -> Self {
        Self {
            bucket_ms,
            capacity: capacity.max(1),
            head: 0,
            buckets: VecDeque::new(),
        }
    }

    fn bucket_index(&self, timestamp_ms: i64) -> i64 {
        timestamp_ms.div_euclid(self.bucket_ms)
    }

    /// Append a sample to the bucket covering its timestamp.
    ///
    /// Within a bucket the sample with the newer timestamp wins, regardless
    /// of arrival order. Samples older than the oldest retained bucket are
    /// dropped. Returns true when the series changed.
    pub(crate) fn append(&mut self, sample: Sample) -> bool {
        let idx = self.bucket_index(sample.timestamp_ms);

        if self.buckets.is_empty() {
            self.head = idx;
            self.buckets.push_back(Some(sample));
            return true;
        }

        if idx < self.head {
            // Bucket already evicted (or before recorded history); drop.
            return false;
        }

        let tail = self.head + self.buckets.len() as i64 - 1;

        if idx > tail {
            // A jump far past the window abandons the stale slots entirely.
            if idx - tail > self.capacity as i64 {
                self.buckets.clear();
                self.head = idx;
                self.buckets.push_back(Some(sample));
                return true;
            }

            for _ in tail + 1..idx {
                self.buckets.push_back(None);
            }
            self.buckets.push_back(Some(sample));

            while self.buckets.len() > self.capacity {
                self.buckets.pop_front();
                self.head += 1;
            }
            return true;
        }

        let slot = (idx - self.head) as usize;
        match self.buckets[slot] {
            Some(existing) if existing.timestamp_ms > sample.timestamp_ms => false,
            _ => {
                self.buckets[slot] = Some(sample);
                true
            }
        }
    }

    /// Buckets overlapping `[from_ms, to_ms)` in chronological order.
    ///
    /// Every bucket slot in the span is present; unrecorded slots are
    /// synthesized as `Unknown` placeholders stamped at the bucket start.
    pub(crate) fn range(&self, from_ms: i64, to_ms: i64) -> Vec<Sample> {
        if from_ms >= to_ms {
            return Vec::new();
        }

        let from_idx = self.bucket_index(from_ms);
        let mut to_idx = to_ms.div_euclid(self.bucket_ms);
        if to_ms.rem_euclid(self.bucket_ms) != 0 {
            to_idx += 1;
        }

        let mut out = Vec::with_capacity((to_idx - from_idx).max(0) as usize);
        for idx in from_idx..to_idx {
            let slot = idx - self.head;
            let recorded = if slot >= 0 && (slot as usize) < self.buckets.len() {
                self.buckets[slot as usize]
            } else {
                None
            };
            out.push(recorded.unwrap_or_else(|| Sample::unknown(idx * self.bucket_ms)));
        }
        out
    }

    /// Most recent recorded sample, if any bucket holds one.
    pub(crate) fn latest(&self) -> Option<Sample> {
        self.buckets.iter().rev().find_map(|b| *b)
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(test)]
    pub(crate) fn oldest_bucket_start_ms(&self) -> Option<i64> {
        if self.buckets.is_empty() {
            None
        } else {
            Some(self.head * self.bucket_ms)
        }
    }
}
