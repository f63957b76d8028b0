//! ProgressObserver trait - live-update channel interface

use crate::ObserverEvent;

/// Fire-and-forget event publisher
///
/// No acknowledgement and no delivery guarantee: implementations must never
/// block the caller or surface errors.
pub trait ProgressObserver: Send + Sync {
    /// Publish an event to every connected listener
    fn publish(&self, event: ObserverEvent);
}
