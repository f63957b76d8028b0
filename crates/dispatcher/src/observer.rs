//! Observer channel implementations

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{InfoStatus, ObserverEvent, ProgressObserver};
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

/// Fan-out to any number of subscribers
///
/// Lagging subscribers lose the oldest events; publishing never blocks.
#[derive(Debug, Clone)]
pub struct BroadcastObserver {
    tx: broadcast::Sender<ObserverEvent>,
}

impl BroadcastObserver {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Attach a new listener
    pub fn subscribe(&self) -> broadcast::Receiver<ObserverEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl ProgressObserver for BroadcastObserver {
    fn publish(&self, event: ObserverEvent) {
        // No subscribers: drop
        if self.tx.send(event).is_err() {
            trace!("No observers connected, event dropped");
        }
    }
}

/// Mirrors events into the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn publish(&self, event: ObserverEvent) {
        match &event {
            ObserverEvent::Logging(message) => debug!(event = "logging", "{message}"),
            ObserverEvent::Info { status, message } => {
                if *status == InfoStatus::Error {
                    warn!(event = "info", status = status.code(), "{message}");
                } else {
                    info!(event = "info", status = status.code(), "{message}");
                }
            }
            ObserverEvent::Percent { counter, total } => {
                debug!(event = "percent", counter, total, "Progress")
            }
            ObserverEvent::Send(sent) => trace!(event = "send", sent, "Send event"),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events with the given name, in publish order
    pub fn named(&self, name: &str) -> Vec<ObserverEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.name() == name)
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn publish(&self, event: ObserverEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

/// Publishes to several observers in order
pub struct FanoutObserver {
    observers: Vec<Arc<dyn ProgressObserver>>,
}

impl FanoutObserver {
    pub fn new(observers: Vec<Arc<dyn ProgressObserver>>) -> Self {
        Self { observers }
    }
}

impl ProgressObserver for FanoutObserver {
    fn publish(&self, event: ObserverEvent) {
        for observer in &self.observers {
            observer.publish(event.clone());
        }
    }
}
