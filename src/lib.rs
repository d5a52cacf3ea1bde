//! pollwell - Polling Aggregation Service
//!
//! Polls pluggable health probes on a per-target cadence, normalizes the
//! irregular results into fixed-bucket time series, and serves derived
//! uptime views and change notifications to many consumers without
//! redundant upstream calls.
//!
//! The crate is transport-agnostic: callers bring a [`Prober`] and an API
//! layer of their own, and talk to the [`Monitor`] facade.

pub mod aggregate;
mod config;
mod error;
mod hub;
mod model;
mod probe;
mod scheduler;
mod store;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use hub::{Subscription, SubscriptionHub};
pub use model::{
    AggregateView, Sample, SampleStatus, SeriesChangeEvent, StatusLabel, Target, TargetKind,
};
pub use probe::{HttpProber, MetricsProber, ProbeError, ProbeOutcome, Prober};
pub use scheduler::Coordinator;
pub use store::SeriesStore;

use std::sync::Arc;

use chrono::Utc;

/// Composition root tying the coordinator, series store, aggregation
/// policy, and subscription hub together behind one handle.
pub struct Monitor {
    config: MonitorConfig,
    store: Arc<SeriesStore>,
    hub: Arc<SubscriptionHub>,
    coordinator: Coordinator,
}

impl Monitor {
    /// Create a monitor with configuration loaded from the environment.
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self::with_config(MonitorConfig::load(), prober)
    }

    pub fn with_config(config: MonitorConfig, prober: Arc<dyn Prober>) -> Self {
        let hub = Arc::new(SubscriptionHub::new(config.hub_capacity));
        let store = Arc::new(SeriesStore::new(
            config.window_ms,
            config.bucket_ms,
            hub.clone(),
        ));
        let coordinator = Coordinator::new(store.clone(), hub.clone(), prober);
        Self {
            config,
            store,
            hub,
            coordinator,
        }
    }

    /// Start monitoring a target. See [`Coordinator::register`].
    pub async fn register(&self, target: Target) -> Result<(), MonitorError> {
        self.coordinator.register(target).await
    }

    /// Stop monitoring a target. See [`Coordinator::unregister`].
    pub async fn unregister(&self, id: &str) -> Result<(), MonitorError> {
        self.coordinator.unregister(id).await
    }

    /// Snapshot of current registrations.
    pub async fn list(&self) -> Vec<Target> {
        self.coordinator.list().await
    }

    /// Bucketed samples for `id` overlapping `[from_ms, to_ms)`, gap-free.
    pub fn query(&self, id: &str, from_ms: i64, to_ms: i64) -> Result<Vec<Sample>, MonitorError> {
        self.store.range(id, from_ms, to_ms)
    }

    /// Derived view over the target's full look-back window, computed fresh.
    pub fn snapshot(&self, id: &str) -> Result<AggregateView, MonitorError> {
        let now_ms = Utc::now().timestamp_millis();
        let samples = self.store.range(id, now_ms - self.config.window_ms, now_ms)?;

        let uptime =
            aggregate::uptime_percentage_with_default(&samples, self.config.default_uptime);

        // Duration spans the recorded portion of the window.
        let recorded: Vec<&Sample> = samples
            .iter()
            .filter(|s| s.status != SampleStatus::Unknown)
            .collect();
        let span_secs = match (recorded.first(), recorded.last()) {
            (Some(first), Some(last)) => (last.timestamp_ms - first.timestamp_ms) / 1000,
            _ => 0,
        };

        Ok(AggregateView {
            uptime_percentage: uptime,
            status_label: aggregate::classify(uptime),
            formatted_duration: aggregate::format_duration(span_secs),
        })
    }

    /// Subscribe to change events for `id` without triggering polls.
    pub fn subscribe(&self, id: &str) -> Subscription {
        self.hub.subscribe(id)
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
