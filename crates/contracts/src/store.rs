//! Persistent store traits
//!
//! Outcome history is insert-only from the engine's point of view;
//! `delete_all` is an administrative operation.

use crate::{AutoReplyRule, ContractError, DeliveryOutcome, StoredOutcome};

/// Delivery outcome storage
#[trait_variant::make(OutcomeStore: Send)]
pub trait LocalOutcomeStore {
    /// Append one outcome, returning its row id
    async fn insert(&self, outcome: &DeliveryOutcome) -> Result<i64, ContractError>;

    /// All outcomes in insertion order
    async fn select_all(&self) -> Result<Vec<StoredOutcome>, ContractError>;

    /// Delete every outcome, returning the number of removed rows
    async fn delete_all(&self) -> Result<usize, ContractError>;
}

/// Keyword auto-reply storage
#[trait_variant::make(AutoReplyStore: Send)]
pub trait LocalAutoReplyStore {
    /// Save a rule (trigger must already be normalized)
    async fn insert_rule(&self, trigger: &str, message: &str) -> Result<i64, ContractError>;

    /// All rules ordered by id
    async fn list_rules(&self) -> Result<Vec<AutoReplyRule>, ContractError>;

    /// First rule whose trigger equals `trigger` exactly
    async fn find_rule(&self, trigger: &str) -> Result<Option<AutoReplyRule>, ContractError>;

    /// Delete a rule by id, returning whether it existed
    async fn delete_rule(&self, id: i64) -> Result<bool, ContractError>;
}
