//! Scheduler module: target registry and per-target sampling loops.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock, Semaphore};

use crate::error::MonitorError;
use crate::hub::SubscriptionHub;
use crate::model::{Sample, SampleStatus, Target};
use crate::probe::Prober;
use crate::store::SeriesStore;

/// Owns the set of monitored targets and one sampler task per target.
///
/// Register and unregister for the same id are serialized; lifecycle
/// operations on different ids only contend for the brief map lock.
pub struct Coordinator {
    store: Arc<SeriesStore>,
    hub: Arc<SubscriptionHub>,
    prober: Arc<dyn Prober>,
    samplers: RwLock<HashMap<String, SamplerHandle>>,
}

struct SamplerHandle {
    target: Target,
    stop_tx: broadcast::Sender<()>,
    /// Cleared on unregister; an in-flight poll checks it before writing so
    /// late results cannot resurrect a removed series.
    active: Arc<AtomicBool>,
}

impl Coordinator {
    pub fn new(store: Arc<SeriesStore>, hub: Arc<SubscriptionHub>, prober: Arc<dyn Prober>) -> Self {
        Self {
            store,
            hub,
            prober,
            samplers: RwLock::new(HashMap::new()),
        }
    }

    /// Start monitoring a target.
    ///
    /// Re-registering an existing id atomically swaps its sampler for one
    /// with the new configuration; recorded history is kept.
    pub async fn register(&self, target: Target) -> Result<(), MonitorError> {
        validate(&target)?;

        let mut samplers = self.samplers.write().await;

        if let Some(old) = samplers.remove(&target.id) {
            old.active.store(false, Ordering::SeqCst);
            let _ = old.stop_tx.send(());
            tracing::info!("Coordinator: replacing sampler for {}", target.id);
        } else {
            tracing::info!("Coordinator: adding target {}", target.id);
        }

        let (stop_tx, stop_rx) = broadcast::channel(1);
        let active = Arc::new(AtomicBool::new(true));

        samplers.insert(
            target.id.clone(),
            SamplerHandle {
                target: target.clone(),
                stop_tx,
                active: active.clone(),
            },
        );
        drop(samplers);

        let prober = self.prober.clone();
        let store = self.store.clone();
        tokio::spawn(run_sampler_loop(target, prober, store, active, stop_rx));

        Ok(())
    }

    /// Stop monitoring a target: cancel its sampler, drop its series, and
    /// close its subscriptions.
    pub async fn unregister(&self, id: &str) -> Result<(), MonitorError> {
        let handle = {
            let mut samplers = self.samplers.write().await;
            samplers
                .remove(id)
                .ok_or_else(|| MonitorError::NotFound(id.to_string()))?
        };

        handle.active.store(false, Ordering::SeqCst);
        let _ = handle.stop_tx.send(());

        self.store.remove(id);
        self.hub.close(id);

        tracing::info!("Coordinator: removed target {}", id);
        Ok(())
    }

    /// Snapshot of current registrations.
    pub async fn list(&self) -> Vec<Target> {
        let samplers = self.samplers.read().await;
        samplers.values().map(|h| h.target.clone()).collect()
    }
}

fn validate(target: &Target) -> Result<(), MonitorError> {
    if target.id.is_empty() {
        return Err(MonitorError::InvalidConfig("target id is empty".to_string()));
    }
    if target.poll_interval_ms == 0 {
        return Err(MonitorError::InvalidConfig(
            "poll_interval_ms must be positive".to_string(),
        ));
    }
    if target.timeout_ms == 0 || target.timeout_ms >= target.poll_interval_ms {
        return Err(MonitorError::InvalidConfig(format!(
            "timeout_ms must be in (0, {})",
            target.poll_interval_ms
        )));
    }
    Ok(())
}

/// Run the sampling loop for a single target.
///
/// The first tick fires immediately. If a poll is still outstanding when
/// the next tick arrives, that tick is skipped rather than queued, so at
/// most one probe per target is ever in flight. Probe failures become
/// `Unknown` samples; the loop only exits on cancellation.
async fn run_sampler_loop(
    target: Target,
    prober: Arc<dyn Prober>,
    store: Arc<SeriesStore>,
    active: Arc<AtomicBool>,
    mut stop_rx: broadcast::Receiver<()>,
) {
    let interval_duration = Duration::from_millis(target.poll_interval_ms);
    let timeout_duration = Duration::from_millis(target.timeout_ms);

    let overlap_guard = Arc::new(Semaphore::new(1));

    let mut interval = tokio::time::interval(interval_duration);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                break;
            }
            _ = interval.tick() => {
                let permit = match overlap_guard.clone().try_acquire_owned() {
                    Ok(p) => p,
                    Err(_) => {
                        tracing::warn!("skipping poll for {} while previous one is in flight", target.id);
                        continue;
                    }
                };

                let prober = prober.clone();
                let store = store.clone();
                let active = active.clone();
                let target = target.clone();

                tokio::spawn(async move {
                    let _permit = permit; // Held until the poll settles
                    let started_ms = Utc::now().timestamp_millis();
                    let sample = poll_once(prober.as_ref(), &target, timeout_duration, started_ms).await;

                    if active.load(Ordering::SeqCst) {
                        store.append(&target.id, sample);
                    } else {
                        tracing::debug!("discarding poll result for {} after unregister", target.id);
                    }
                });
            }
        }
    }

    tracing::debug!("sampler loop for {} exited", target.id);
}

/// Execute one probe within the target's timeout budget and convert the
/// outcome into a sample stamped at poll start.
async fn poll_once(
    prober: &dyn Prober,
    target: &Target,
    budget: Duration,
    started_ms: i64,
) -> Sample {
    match tokio::time::timeout(budget, prober.probe(target)).await {
        Ok(Ok(outcome)) => Sample {
            timestamp_ms: started_ms,
            status: if outcome.up {
                SampleStatus::Up
            } else {
                SampleStatus::Down
            },
            latency_ms: outcome.latency_ms,
        },
        Ok(Err(e)) => {
            tracing::warn!("probe failed for {}: {}", target.id, e);
            Sample::unknown(started_ms)
        }
        Err(_) => {
            tracing::warn!(
                "probe for {} exceeded its {}ms budget",
                target.id,
                target.timeout_ms
            );
            Sample::unknown(started_ms)
        }
    }
}
