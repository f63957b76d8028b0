//! DeliveryOutcome - Outcome Recorder input

use serde::{Deserialize, Serialize};

/// Result of processing one recipient
///
/// Appended to storage and never mutated. `delivered` records the attempt,
/// not a confirmed receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub recipient_name: String,
    pub destination_address: String,
    pub delivered: bool,
}

impl DeliveryOutcome {
    pub fn new(
        recipient_name: impl Into<String>,
        destination_address: impl Into<String>,
        delivered: bool,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            destination_address: destination_address.into(),
            delivered,
        }
    }
}

/// Outcome row as read back from storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredOutcome {
    /// Storage row id (insertion order)
    pub id: i64,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}
