//! Broadcast Engine - the rate-limited sequential dispatch loop
//!
//! One recipient at a time, in input order:
//!
//! ```text
//! cancelled? ─▶ wait interval ─▶ render ─▶ deliverable? ─▶ attachment
//!            ─▶ archive (detached) ─▶ send ─▶ record + progress ─▶ next
//! ```
//!
//! Cancellation is cooperative: the token is consulted before a recipient
//! starts (including while waiting out the interval), never during one.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use contracts::{
    ArchiveEntry, BroadcastRequest, ContractError, DeliveryOutcome, DispatchConfig,
    HistoryArchive, MediaPayload, MessagingTransport, ObserverEvent, OutcomeStore,
    ProgressObserver, RecipientRecord,
};
use ingestion::AddressFormatter;
use observability::{CampaignAggregator, CampaignSummary};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::attachment::AttachmentLoader;
use crate::error::DispatcherError;
use crate::metrics::{CampaignMetrics, MetricsSnapshot};
use crate::observer::LogObserver;
use crate::recorder::OutcomeRecorder;

/// Terminal info message published after the settle delay
pub const FINISHED_MESSAGE: &str = "🚀 Broadcast finished!";

const DEFAULT_ATTACHMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Loop pacing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Wait before every recipient, including the first
    pub send_interval: Duration,
    /// Wait between the last recipient and the finished event
    pub settle_delay: Duration,
}

impl From<&DispatchConfig> for EngineConfig {
    fn from(config: &DispatchConfig) -> Self {
        Self {
            send_interval: Duration::from_millis(config.send_interval_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from(&DispatchConfig::default())
    }
}

/// State of one campaign, owned by the loop while it runs
#[derive(Debug)]
pub struct CampaignState {
    records: Vec<RecipientRecord>,
    request: BroadcastRequest,
    /// Next index to process
    cursor: usize,
    delivered: usize,
    token: CancellationToken,
}

impl CampaignState {
    pub fn new(records: Vec<RecipientRecord>, request: BroadcastRequest) -> Self {
        Self::with_token(records, request, CancellationToken::new())
    }

    pub fn with_token(
        records: Vec<RecipientRecord>,
        request: BroadcastRequest,
        token: CancellationToken,
    ) -> Self {
        Self {
            records,
            request,
            cursor: 0,
            delivered: 0,
            token,
        }
    }

    pub fn records(&self) -> &[RecipientRecord] {
        &self.records
    }

    pub fn request(&self) -> &BroadcastRequest {
        &self.request
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Token that stops the loop before the next recipient
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn report(&self) -> CampaignReport {
        CampaignReport {
            total: self.total(),
            processed: self.cursor,
            delivered: self.delivered,
            cancelled: self.cursor < self.total(),
        }
    }
}

/// Summary of a finished campaign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CampaignReport {
    pub total: usize,
    pub processed: usize,
    pub delivered: usize,
    /// Stopped before reaching the end of the list
    pub cancelled: bool,
}

/// Builder for [`BroadcastEngine`]
pub struct BroadcastEngineBuilder<T, S, A> {
    transport: Arc<T>,
    store: Arc<S>,
    archive: Arc<A>,
    observer: Arc<dyn ProgressObserver>,
    formatter: AddressFormatter,
    config: EngineConfig,
    attachments: Option<AttachmentLoader>,
}

impl<T, S, A> BroadcastEngineBuilder<T, S, A>
where
    T: MessagingTransport + Send + Sync + 'static,
    S: OutcomeStore + Send + Sync + 'static,
    A: HistoryArchive + Send + Sync + 'static,
{
    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn formatter(mut self, formatter: AddressFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn attachments(mut self, loader: AttachmentLoader) -> Self {
        self.attachments = Some(loader);
        self
    }

    pub fn build(self) -> Result<BroadcastEngine<T, S, A>, DispatcherError> {
        let attachments = match self.attachments {
            Some(loader) => loader,
            None => AttachmentLoader::new(DEFAULT_ATTACHMENT_TIMEOUT)?,
        };
        let metrics = Arc::new(CampaignMetrics::new());
        let recorder = OutcomeRecorder::new(
            Arc::clone(&self.store),
            Arc::clone(&self.observer),
            Arc::clone(&metrics),
        );

        Ok(BroadcastEngine {
            transport: self.transport,
            store: self.store,
            archive: self.archive,
            observer: self.observer,
            recorder,
            attachments,
            formatter: self.formatter,
            config: self.config,
            metrics,
            aggregator: Mutex::new(CampaignAggregator::new()),
        })
    }
}

/// The dispatch loop and its collaborators
pub struct BroadcastEngine<T, S, A> {
    transport: Arc<T>,
    store: Arc<S>,
    archive: Arc<A>,
    observer: Arc<dyn ProgressObserver>,
    recorder: OutcomeRecorder<S>,
    attachments: AttachmentLoader,
    formatter: AddressFormatter,
    config: EngineConfig,
    metrics: Arc<CampaignMetrics>,
    aggregator: Mutex<CampaignAggregator>,
}

impl<T, S, A> BroadcastEngine<T, S, A>
where
    T: MessagingTransport + Send + Sync + 'static,
    S: OutcomeStore + Send + Sync + 'static,
    A: HistoryArchive + Send + Sync + 'static,
{
    /// Start building an engine; observer defaults to the log, pacing to config defaults
    pub fn builder(
        transport: Arc<T>,
        store: Arc<S>,
        archive: Arc<A>,
    ) -> BroadcastEngineBuilder<T, S, A> {
        BroadcastEngineBuilder {
            transport,
            store,
            archive,
            observer: Arc::new(LogObserver),
            formatter: AddressFormatter::default(),
            config: EngineConfig::default(),
            attachments: None,
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn observer(&self) -> &Arc<dyn ProgressObserver> {
        &self.observer
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Counters accumulated over every campaign this engine ran
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Delivery rate and per-recipient timing
    pub fn summary(&self) -> CampaignSummary {
        self.aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .summary()
    }

    /// Dispatch every recipient, then settle and publish the finished event
    pub async fn run(&self, state: CampaignState) -> CampaignState {
        let state = self.dispatch(state).await;
        self.finish().await;
        state
    }

    /// The per-recipient loop; returns the state at the point it stopped
    #[instrument(
        name = "broadcast_engine_dispatch",
        skip(self, state),
        fields(total = state.total())
    )]
    pub async fn dispatch(&self, mut state: CampaignState) -> CampaignState {
        let total = state.total();
        info!(
            total,
            interval_ms = self.config.send_interval.as_millis() as u64,
            "Campaign dispatch started"
        );

        while state.cursor < total {
            if state.token.is_cancelled() {
                break;
            }
            tokio::select! {
                biased;
                _ = state.token.cancelled() => break,
                _ = tokio::time::sleep(self.config.send_interval) => {}
            }

            let index = state.cursor;
            if self
                .process(index, total, &state.records[index], &state.request)
                .await
            {
                state.delivered += 1;
            }
            state.cursor += 1;
        }

        let report = state.report();
        if report.cancelled {
            info!(processed = report.processed, total, "Campaign stopped early");
        } else {
            info!(delivered = report.delivered, total, "Campaign dispatch complete");
        }
        state
    }

    /// Settle delay, then the terminal info event
    pub async fn finish(&self) {
        tokio::time::sleep(self.config.settle_delay).await;
        self.observer.publish(ObserverEvent::info(FINISHED_MESSAGE));
    }

    /// Full processing of one recipient; returns whether the send succeeded
    #[instrument(
        name = "broadcast_engine_process",
        skip(self, total, record, request),
        fields(recipient = %record.name, address = %record.address)
    )]
    async fn process(
        &self,
        index: usize,
        total: usize,
        record: &RecipientRecord,
        request: &BroadcastRequest,
    ) -> bool {
        let started = Instant::now();
        let message = template::render(&request.template, record);
        let chat_id = self.formatter.chat_id(&record.address);

        let deliverable = self.check_deliverable(&chat_id).await;

        let media = match &request.attachment {
            Some(attachment) => Some(self.attachments.load(attachment).await),
            None => None,
        };

        self.spawn_archive(record, request, &message);

        let delivered = if deliverable {
            self.send(&chat_id, &message, media).await
        } else {
            self.metrics.inc_undeliverable();
            debug!(chat_id, "Not registered, send skipped");
            false
        };

        let outcome = DeliveryOutcome::new(&record.name, &record.address, delivered);
        self.metrics.inc_processed();
        if delivered {
            self.metrics.inc_delivered();
        }
        observability::record_outcome(&outcome);
        self.recorder.record(index, total, &outcome).await;

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        observability::record_recipient_duration_ms(elapsed_ms);
        self.aggregator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update(&outcome, elapsed_ms);

        delivered
    }

    /// Check errors count as "not deliverable"
    async fn check_deliverable(&self, chat_id: &str) -> bool {
        match self.transport.is_registered(chat_id).await {
            Ok(registered) => registered,
            Err(e) => {
                warn!(chat_id, error = %e, "Deliverability check failed");
                false
            }
        }
    }

    async fn send(
        &self,
        chat_id: &str,
        message: &str,
        media: Option<Result<MediaPayload, ContractError>>,
    ) -> bool {
        let (result, sent_text) = match media {
            None => (self.transport.send_text(chat_id, message).await, "Message sent"),
            Some(Ok(media)) => (
                self.transport.send_media(chat_id, &media, message).await,
                "Media sent",
            ),
            Some(Err(e)) => (Err(e), ""),
        };

        match result {
            Ok(()) => {
                info!(chat_id, "{sent_text}");
                self.observer.publish(ObserverEvent::logging(sent_text));
                self.observer.publish(ObserverEvent::Send(true));
                true
            }
            Err(e) => {
                self.metrics.inc_send_failures();
                observability::record_send_failure(self.transport.name());
                warn!(chat_id, error = %e, "Send failed");
                false
            }
        }
    }

    /// Fire-and-forget archive call; skipped for the sentinel destination
    fn spawn_archive(&self, record: &RecipientRecord, request: &BroadcastRequest, message: &str) {
        let phone = self.formatter.archive_phone(&record.address);
        if phone == self.formatter.sentinel_phone() {
            debug!(recipient = %record.name, "Sentinel address, archive skipped");
            return;
        }

        let entry = ArchiveEntry {
            identity: request.identity.clone(),
            pmb: request.pmb.clone(),
            phone,
            title: request.title_or_empty().to_string(),
            result: message.to_string(),
        };
        let archive = Arc::clone(&self.archive);
        let observer = Arc::clone(&self.observer);
        let metrics = Arc::clone(&self.metrics);

        tokio::spawn(async move {
            match archive.archive(&entry).await {
                Ok(()) => {
                    observability::record_archive_call(true);
                    observer.publish(ObserverEvent::logging("Chat history stored."));
                }
                Err(e) => {
                    metrics.inc_archive_failures();
                    observability::record_archive_call(false);
                    warn!(phone = %entry.phone, error = %e, "Failed to store chat history");
                    observer.publish(ObserverEvent::logging("Failed to store chat history."));
                }
            }
        });
    }
}
