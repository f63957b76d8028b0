//! Campaign controller - submission and control boundaries
//!
//! Enforces one active campaign per process:
//! `Idle → Running → (Stopping) → Completed → Idle`.
//! A new submission is only accepted in `Idle`.

use std::sync::{Arc, Mutex, PoisonError};

use contracts::{
    BroadcastRequest, HistoryArchive, MessagingTransport, ObserverEvent, OutcomeStore,
    SessionState, StoredOutcome,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::engine::{BroadcastEngine, CampaignReport, CampaignState};
use crate::error::DispatcherError;

/// Message published when a campaign is accepted
pub const STARTED_MESSAGE: &str = "📣 Broadcast started";

/// Campaign lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    /// No campaign active
    Idle,
    /// Dispatch loop advancing
    Running,
    /// Stop requested; the in-flight recipient is finishing
    Stopping,
    /// Loop done; waiting out the settle delay
    Completed,
}

/// Returns the controller to `Idle` when the campaign task ends, unwinding included
struct PhaseReset(Arc<watch::Sender<CampaignPhase>>);

impl Drop for PhaseReset {
    fn drop(&mut self) {
        if std::thread::panicking() {
            observability::record_campaign_phase("failed");
            error!("Campaign task panicked, controller back to idle");
        }
        self.0.send_replace(CampaignPhase::Idle);
    }
}

struct ActiveCampaign {
    token: CancellationToken,
    handle: Option<JoinHandle<CampaignReport>>,
}

/// Owns the engine and the single active campaign
pub struct CampaignController<T, S, A> {
    engine: Arc<BroadcastEngine<T, S, A>>,
    phase: Arc<watch::Sender<CampaignPhase>>,
    /// Guards phase transitions out of Idle / Running
    active: Mutex<Option<ActiveCampaign>>,
}

impl<T, S, A> CampaignController<T, S, A>
where
    T: MessagingTransport + Send + Sync + 'static,
    S: OutcomeStore + Send + Sync + 'static,
    A: HistoryArchive + Send + Sync + 'static,
{
    pub fn new(engine: BroadcastEngine<T, S, A>) -> Self {
        let (phase, _) = watch::channel(CampaignPhase::Idle);
        Self {
            engine: Arc::new(engine),
            phase: Arc::new(phase),
            active: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<BroadcastEngine<T, S, A>> {
        &self.engine
    }

    pub fn phase(&self) -> CampaignPhase {
        *self.phase.borrow()
    }

    /// Watch phase transitions
    pub fn subscribe_phase(&self) -> watch::Receiver<CampaignPhase> {
        self.phase.subscribe()
    }

    /// Submit a campaign from a raw recipient list
    ///
    /// Returns the number of parsed recipients. Rejections caused by the
    /// transport session are also published as an error `info` event.
    #[instrument(name = "campaign_controller_submit", skip(self, raw, request))]
    pub async fn submit(
        &self,
        raw: &str,
        request: BroadcastRequest,
    ) -> Result<usize, DispatcherError> {
        let observer = self.engine.observer();

        let state = match self.engine.transport().session_state().await {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "Session state query failed");
                SessionState::Disconnected
            }
        };
        if state != SessionState::Connected {
            observability::record_campaign_phase("rejected");
            observer.publish(ObserverEvent::error(format!(
                "Messaging session is not connected ({state}), broadcast not started"
            )));
            return Err(DispatcherError::not_ready(state));
        }

        if let Some(attachment) = &request.attachment {
            // Fields are public; catch requests built without Attachment::new
            contracts::Attachment::new(
                attachment.filename.clone(),
                attachment.mime_type.clone(),
                attachment.source.clone(),
            )?;
        }

        let records = ingestion::parse_recipients(raw);
        if records.is_empty() {
            observer.publish(ObserverEvent::error("Recipient list is empty"));
            return Err(DispatcherError::EmptyRecipients);
        }

        let total = records.len();
        let token = CancellationToken::new();
        let state = CampaignState::with_token(records, request, token.clone());

        let mut active = self.lock_active();
        let accepted = self.phase.send_if_modified(|phase| {
            if *phase == CampaignPhase::Idle {
                *phase = CampaignPhase::Running;
                true
            } else {
                false
            }
        });
        if !accepted {
            return Err(DispatcherError::CampaignActive);
        }

        observability::record_campaign_phase("started");
        observer.publish(ObserverEvent::info(STARTED_MESSAGE));
        info!(total, "Campaign accepted");

        let engine = Arc::clone(&self.engine);
        let phase = Arc::clone(&self.phase);
        let handle = tokio::spawn(async move {
            let _reset = PhaseReset(Arc::clone(&phase));
            let state = engine.dispatch(state).await;
            phase.send_replace(CampaignPhase::Completed);
            engine.finish().await;
            observability::record_campaign_phase("completed");
            state.report()
        });

        *active = Some(ActiveCampaign {
            token,
            handle: Some(handle),
        });
        Ok(total)
    }

    /// Request cancellation of the running campaign
    ///
    /// Returns whether a running campaign was asked to stop.
    pub fn stop(&self) -> bool {
        let active = self.lock_active();
        let stopping = self.phase.send_if_modified(|phase| {
            if *phase == CampaignPhase::Running {
                *phase = CampaignPhase::Stopping;
                true
            } else {
                false
            }
        });
        if !stopping {
            return false;
        }
        if let Some(active) = active.as_ref() {
            active.token.cancel();
        }
        drop(active);

        observability::record_campaign_phase("stopping");
        self.engine
            .observer()
            .publish(ObserverEvent::logging("Broadcast stopped."));
        info!("Campaign stop requested");
        true
    }

    /// Wait for the current campaign (loop, settle delay, finished event)
    ///
    /// `None` when nothing was submitted since the last wait.
    pub async fn wait(&self) -> Result<Option<CampaignReport>, DispatcherError> {
        let handle = self
            .lock_active()
            .as_mut()
            .and_then(|active| active.handle.take());
        match handle {
            Some(handle) => Ok(Some(handle.await?)),
            None => Ok(None),
        }
    }

    /// All recorded outcomes
    pub async fn history(&self) -> Result<Vec<StoredOutcome>, DispatcherError> {
        Ok(self.engine.store().select_all().await?)
    }

    /// Administrative wipe of the outcome history
    #[instrument(name = "campaign_controller_clear_history", skip(self))]
    pub async fn clear_history(&self) -> Result<usize, DispatcherError> {
        let removed = self.engine.store().delete_all().await?;
        self.engine
            .observer()
            .publish(ObserverEvent::logging("Broadcast history cleared."));
        info!(removed, "History cleared");
        Ok(removed)
    }

    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveCampaign>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
