//! Outcome Recorder - persist one outcome, then report progress

use std::sync::Arc;

use contracts::{DeliveryOutcome, ObserverEvent, OutcomeStore, ProgressObserver};
use tracing::{debug, error, instrument};

use crate::metrics::CampaignMetrics;

/// Appends outcomes and relays the matching progress events
pub struct OutcomeRecorder<S> {
    store: Arc<S>,
    observer: Arc<dyn ProgressObserver>,
    metrics: Arc<CampaignMetrics>,
}

impl<S: OutcomeStore + Send + Sync> OutcomeRecorder<S> {
    pub fn new(
        store: Arc<S>,
        observer: Arc<dyn ProgressObserver>,
        metrics: Arc<CampaignMetrics>,
    ) -> Self {
        Self {
            store,
            observer,
            metrics,
        }
    }

    /// Record the outcome of the recipient at `index` (0-based)
    ///
    /// Storage errors are logged and swallowed; both progress events are
    /// emitted either way.
    #[instrument(
        name = "outcome_recorder_record",
        skip(self, outcome),
        fields(recipient = %outcome.recipient_name, delivered = outcome.delivered)
    )]
    pub async fn record(&self, index: usize, total: usize, outcome: &DeliveryOutcome) {
        match self.store.insert(outcome).await {
            Ok(id) => debug!(id, "Contact recorded"),
            Err(e) => {
                self.metrics.inc_store_failures();
                error!(
                    recipient = %outcome.recipient_name,
                    address = %outcome.destination_address,
                    error = %e,
                    "Failed to record outcome"
                );
            }
        }

        self.observer.publish(ObserverEvent::info(format!(
            "✅ {} - {}",
            outcome.recipient_name, outcome.destination_address
        )));
        self.observer
            .publish(ObserverEvent::percent(index + 1, total));
        observability::record_campaign_progress(index + 1, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::store::MemoryStore;
    use contracts::{ContractError, StoredOutcome};

    struct BrokenStore;

    impl OutcomeStore for BrokenStore {
        async fn insert(&self, _outcome: &DeliveryOutcome) -> Result<i64, ContractError> {
            Err(ContractError::store("disk full"))
        }

        async fn select_all(&self) -> Result<Vec<StoredOutcome>, ContractError> {
            Ok(Vec::new())
        }

        async fn delete_all(&self) -> Result<usize, ContractError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_record_persists_and_reports() {
        let store = Arc::new(MemoryStore::new());
        let observer = Arc::new(RecordingObserver::new());
        let recorder = OutcomeRecorder::new(
            Arc::clone(&store),
            observer.clone(),
            Arc::new(CampaignMetrics::new()),
        );

        recorder
            .record(1, 3, &DeliveryOutcome::new("Bob", "0000000000", false))
            .await;

        assert_eq!(store.outcomes().len(), 1);
        assert_eq!(
            observer.events(),
            vec![
                ObserverEvent::info("✅ Bob - 0000000000"),
                ObserverEvent::percent(2, 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failure_still_reports_progress() {
        let observer = Arc::new(RecordingObserver::new());
        let metrics = Arc::new(CampaignMetrics::new());
        let recorder =
            OutcomeRecorder::new(Arc::new(BrokenStore), observer.clone(), Arc::clone(&metrics));

        recorder
            .record(0, 1, &DeliveryOutcome::new("Alice", "5551234567", true))
            .await;

        assert_eq!(observer.named("percent"), vec![ObserverEvent::percent(1, 1)]);
        assert_eq!(metrics.snapshot().store_failures, 1);
    }
}
