//! Concrete collaborators selected from configuration.

use contracts::{
    ContractError, MediaPayload, MessagingTransport, SessionState, TransportConfig, TransportKind,
};
use transport::{GatewayConfig, GatewayTransport, MockTransport};

/// Transport chosen by `transport.kind`
pub enum TransportBackend {
    Gateway(GatewayTransport),
    Mock(MockTransport),
}

impl TransportBackend {
    pub fn from_config(config: &TransportConfig) -> Result<Self, ContractError> {
        match config.kind {
            TransportKind::Gateway => {
                GatewayTransport::new(GatewayConfig::from(config)).map(Self::Gateway)
            }
            TransportKind::Mock => Ok(Self::Mock(MockTransport::new())),
        }
    }
}

impl MessagingTransport for TransportBackend {
    fn name(&self) -> &str {
        match self {
            Self::Gateway(t) => t.name(),
            Self::Mock(t) => t.name(),
        }
    }

    async fn session_state(&self) -> Result<SessionState, ContractError> {
        match self {
            Self::Gateway(t) => t.session_state().await,
            Self::Mock(t) => t.session_state().await,
        }
    }

    async fn is_registered(&self, chat_id: &str) -> Result<bool, ContractError> {
        match self {
            Self::Gateway(t) => t.is_registered(chat_id).await,
            Self::Mock(t) => t.is_registered(chat_id).await,
        }
    }

    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ContractError> {
        match self {
            Self::Gateway(t) => t.send_text(chat_id, text).await,
            Self::Mock(t) => t.send_text(chat_id, text).await,
        }
    }

    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaPayload,
        caption: &str,
    ) -> Result<(), ContractError> {
        match self {
            Self::Gateway(t) => t.send_media(chat_id, media, caption).await,
            Self::Mock(t) => t.send_media(chat_id, media, caption).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_selected() {
        let config = TransportConfig {
            kind: TransportKind::Mock,
            ..TransportConfig::default()
        };
        let backend = TransportBackend::from_config(&config).unwrap();
        assert_eq!(backend.name(), "mock");
        assert_eq!(
            backend.session_state().await.unwrap(),
            SessionState::Connected
        );
    }

    #[test]
    fn test_gateway_backend_selected_by_default() {
        let backend = TransportBackend::from_config(&TransportConfig::default()).unwrap();
        assert_eq!(backend.name(), "gateway");
    }
}
