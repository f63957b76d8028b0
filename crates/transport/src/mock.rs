//! Mock messaging transport
//!
//! In-memory implementation with injectable failures. Records every send so
//! tests can assert on exactly what went out.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{ContractError, MediaPayload, MessagingTransport, SessionState};
use tracing::{debug, instrument};

/// Mock transport configuration
#[derive(Debug, Clone)]
pub struct MockTransportConfig {
    /// Reported session state
    pub state: SessionState,
    /// Chat ids reported as not registered
    pub unregistered: HashSet<String>,
    /// Chat ids whose registration check errors
    pub failing_checks: HashSet<String>,
    /// Chat ids whose send errors
    pub failing_sends: HashSet<String>,
    /// Artificial latency per send
    pub send_delay: Duration,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            state: SessionState::Connected,
            unregistered: HashSet::new(),
            failing_checks: HashSet::new(),
            failing_sends: HashSet::new(),
            send_delay: Duration::ZERO,
        }
    }
}

/// A message accepted by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub chat_id: String,
    pub text: String,
    /// Filename of the attached media, if any
    pub media: Option<String>,
}

/// Mock messaging transport
#[derive(Debug, Default)]
pub struct MockTransport {
    config: MockTransportConfig,
    state: Mutex<Option<SessionState>>,
    sent: Mutex<Vec<SentMessage>>,
    checks: AtomicUsize,
}

impl MockTransport {
    /// Connected transport where every chat id is registered
    pub fn new() -> Self {
        Self::with_config(MockTransportConfig::default())
    }

    pub fn with_config(config: MockTransportConfig) -> Self {
        Self {
            config,
            state: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
            checks: AtomicUsize::new(0),
        }
    }

    /// Override the session state at runtime
    pub fn set_state(&self, state: SessionState) {
        *lock(&self.state) = Some(state);
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// Number of registration checks issued
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    async fn deliver(
        &self,
        chat_id: &str,
        text: &str,
        media: Option<String>,
    ) -> Result<(), ContractError> {
        if !self.config.send_delay.is_zero() {
            tokio::time::sleep(self.config.send_delay).await;
        }
        if self.config.failing_sends.contains(chat_id) {
            return Err(ContractError::transport("mock", format!("send to {chat_id} rejected")));
        }
        lock(&self.sent).push(SentMessage {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            media,
        });
        debug!(chat_id, "mock message accepted");
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MessagingTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn session_state(&self) -> Result<SessionState, ContractError> {
        Ok(lock(&self.state).unwrap_or(self.config.state))
    }

    #[instrument(name = "mock_transport_is_registered", skip(self))]
    async fn is_registered(&self, chat_id: &str) -> Result<bool, ContractError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.config.failing_checks.contains(chat_id) {
            return Err(ContractError::transport("mock", format!("lookup of {chat_id} failed")));
        }
        Ok(!self.config.unregistered.contains(chat_id))
    }

    #[instrument(name = "mock_transport_send_text", skip(self, text))]
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ContractError> {
        self.deliver(chat_id, text, None).await
    }

    #[instrument(
        name = "mock_transport_send_media",
        skip(self, media, caption),
        fields(filename = %media.filename)
    )]
    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaPayload,
        caption: &str,
    ) -> Result<(), ContractError> {
        self.deliver(chat_id, caption, Some(media.filename.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_mock_records_sends() {
        let transport = MockTransport::new();
        transport.send_text("1@c.us", "hello").await.unwrap();
        let media = MediaPayload {
            filename: "a.png".into(),
            mime_type: "image/png".into(),
            data: Bytes::from_static(b"png"),
        };
        transport.send_media("2@c.us", &media, "cap").await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].text, "hello");
        assert_eq!(sent[1].media.as_deref(), Some("a.png"));
    }

    #[tokio::test]
    async fn test_mock_injected_failures() {
        let mut config = MockTransportConfig::default();
        config.unregistered.insert("1@c.us".into());
        config.failing_checks.insert("2@c.us".into());
        config.failing_sends.insert("3@c.us".into());
        let transport = MockTransport::with_config(config);

        assert!(!transport.is_registered("1@c.us").await.unwrap());
        assert!(transport.is_registered("2@c.us").await.is_err());
        assert!(transport.is_registered("3@c.us").await.unwrap());
        assert!(transport.send_text("3@c.us", "x").await.is_err());
        assert_eq!(transport.check_count(), 3);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mock_state_override() {
        let transport = MockTransport::new();
        assert_eq!(transport.session_state().await.unwrap(), SessionState::Connected);
        transport.set_state(SessionState::Disconnected);
        assert_eq!(
            transport.session_state().await.unwrap(),
            SessionState::Disconnected
        );
    }
}
