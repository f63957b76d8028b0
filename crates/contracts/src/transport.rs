//! MessagingTransport trait - messaging session interface
//!
//! Session management (pairing, reconnects) lives outside the broadcast core;
//! the engine only needs these four calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ContractError, MediaPayload};

/// Transport session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Ready to send
    Connected,
    /// Connecting / syncing
    Opening,
    /// Waiting for device pairing
    Unpaired,
    /// Session lost
    Disconnected,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Connected => "CONNECTED",
            SessionState::Opening => "OPENING",
            SessionState::Unpaired => "UNPAIRED",
            SessionState::Disconnected => "DISCONNECTED",
        };
        f.write_str(s)
    }
}

/// Messaging transport trait
///
/// Addresses passed here are transport chat ids (already formatted).
#[trait_variant::make(MessagingTransport: Send)]
pub trait LocalMessagingTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Current session state
    async fn session_state(&self) -> Result<SessionState, ContractError>;

    /// Whether the chat id can receive messages
    async fn is_registered(&self, chat_id: &str) -> Result<bool, ContractError>;

    /// Send a text message
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ContractError>;

    /// Send media with the text as caption
    async fn send_media(
        &self,
        chat_id: &str,
        media: &MediaPayload,
        caption: &str,
    ) -> Result<(), ContractError>;
}
