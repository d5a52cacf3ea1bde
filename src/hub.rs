//! Fan-out of series change notifications to interested consumers.

use std::collections::HashMap;
use std::sync::RwLock;

use tokio::sync::broadcast;

use crate::model::SeriesChangeEvent;

/// Delivers change events for a target to any number of subscribers without
/// the publisher ever blocking.
///
/// Each subscriber has a small bounded buffer; when it falls behind, the
/// oldest pending events are dropped and delivery resumes with the newest.
/// Consumers are expected to re-query the series on wake rather than trust
/// every event to carry full data.
pub struct SubscriptionHub {
    capacity: usize,
    channels: RwLock<HashMap<String, broadcast::Sender<SeriesChangeEvent>>>,
}

impl SubscriptionHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to change events for `id`.
    ///
    /// Subscribing to an id with no series yet is allowed; events arrive
    /// once something is appended for it.
    pub fn subscribe(&self, id: &str) -> Subscription {
        let mut channels = self.channels.write().unwrap();
        let tx = channels
            .entry(id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Subscription {
            rx: Some(tx.subscribe()),
        }
    }

    /// Best-effort publish to all subscribers of the event's target.
    ///
    /// Never blocks; an id with no subscribers is a no-op.
    pub fn publish(&self, event: SeriesChangeEvent) {
        let channels = self.channels.read().unwrap();
        if let Some(tx) = channels.get(&event.target_id) {
            // SendError only means there are no live receivers right now.
            let _ = tx.send(event);
        }
    }

    /// Disconnect all subscribers of `id`; their streams end.
    pub fn close(&self, id: &str) {
        self.channels.write().unwrap().remove(id);
    }
}

/// A consumer's handle on one target's change events.
pub struct Subscription {
    rx: Option<broadcast::Receiver<SeriesChangeEvent>>,
}

impl Subscription {
    /// Receive the next change event.
    ///
    /// Returns `None` once the subscription is cancelled or the target's
    /// channel is closed. Events dropped due to a full buffer are skipped
    /// silently, resuming at the oldest still-buffered event.
    pub async fn recv(&mut self) -> Option<SeriesChangeEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("subscriber lagged, skipped {} events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Non-blocking poll for a pending event.
    pub fn try_recv(&mut self) -> Option<SeriesChangeEvent> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Closed) => {
                    self.rx = None;
                    return None;
                }
            }
        }
    }

    /// Stop receiving events. Safe to call multiple times.
    pub fn cancel(&mut self) {
        self.rx = None;
    }
}
