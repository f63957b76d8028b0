//! Keyword auto-responder

use std::sync::Arc;

use contracts::{normalize_trigger, AutoReplyRule, AutoReplyStore, ContractError};
use tracing::{debug, instrument};

/// Exact-match keyword replies backed by an [`AutoReplyStore`]
pub struct AutoResponder<S> {
    store: Arc<S>,
}

impl<S: AutoReplyStore + Send + Sync> AutoResponder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Reply for an inbound text, if a rule matches
    ///
    /// Empty (after normalization) text never matches.
    #[instrument(name = "auto_responder_reply_for", skip(self, text))]
    pub async fn reply_for(&self, text: &str) -> Result<Option<String>, ContractError> {
        let trigger = normalize_trigger(text);
        if trigger.is_empty() {
            return Ok(None);
        }
        let rule = self.store.find_rule(&trigger).await?;
        debug!(trigger, matched = rule.is_some(), "Auto-reply lookup");
        Ok(rule.map(|rule| rule.message))
    }

    /// Save a rule; the trigger is stored normalized
    pub async fn save_rule(
        &self,
        trigger: &str,
        message: &str,
    ) -> Result<AutoReplyRule, ContractError> {
        let trigger = normalize_trigger(trigger);
        if trigger.is_empty() {
            return Err(ContractError::invalid_input("trigger", "trigger must not be empty"));
        }
        if message.trim().is_empty() {
            return Err(ContractError::invalid_input("message", "message must not be empty"));
        }
        let id = self.store.insert_rule(&trigger, message).await?;
        Ok(AutoReplyRule {
            id,
            trigger,
            message: message.to_string(),
        })
    }

    pub async fn list_rules(&self) -> Result<Vec<AutoReplyRule>, ContractError> {
        self.store.list_rules().await
    }

    pub async fn delete_rule(&self, id: i64) -> Result<bool, ContractError> {
        self.store.delete_rule(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, SqliteStore};

    #[tokio::test]
    async fn test_reply_matches_normalized_text() {
        let responder = AutoResponder::new(Arc::new(SqliteStore::open_in_memory().unwrap()));
        let rule = responder
            .save_rule("  'Info PMB'; ", "Pendaftaran dibuka")
            .await
            .unwrap();
        assert_eq!(rule.trigger, "info pmb");

        assert_eq!(
            responder.reply_for("INFO \"PMB\"").await.unwrap().as_deref(),
            Some("Pendaftaran dibuka")
        );
        assert_eq!(responder.reply_for("info").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_first_rule_wins() {
        let responder = AutoResponder::new(Arc::new(MemoryStore::new()));
        responder.save_rule("halo", "first").await.unwrap();
        responder.save_rule("HALO", "second").await.unwrap();

        assert_eq!(
            responder.reply_for("halo").await.unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(responder.list_rules().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_inputs() {
        let responder = AutoResponder::new(Arc::new(MemoryStore::new()));
        assert_eq!(responder.reply_for("  ';' ").await.unwrap(), None);
        assert!(matches!(
            responder.save_rule("\"\"", "x").await,
            Err(ContractError::InvalidInput { .. })
        ));
        assert!(matches!(
            responder.save_rule("halo", "   ").await,
            Err(ContractError::InvalidInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_rule() {
        let responder = AutoResponder::new(Arc::new(MemoryStore::new()));
        let rule = responder.save_rule("halo", "hai").await.unwrap();
        assert!(responder.delete_rule(rule.id).await.unwrap());
        assert_eq!(responder.reply_for("halo").await.unwrap(), None);
    }
}
