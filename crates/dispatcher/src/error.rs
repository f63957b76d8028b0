//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Only submission-time problems surface here; per-recipient failures are
/// converted into outcomes inside the loop.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A campaign is running, stopping or waiting out its settle delay
    #[error("a campaign is already active")]
    CampaignActive,

    /// Transport session is not connected
    #[error("transport session not ready: {state}")]
    TransportNotReady { state: String },

    /// Submission with no recipients
    #[error("recipient list is empty")]
    EmptyRecipients,

    /// Collaborator error (from contract)
    #[error("{0}")]
    Contract(#[from] contracts::ContractError),

    /// Campaign task failed to join
    #[error("campaign task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl DispatcherError {
    /// Create a transport-not-ready error
    pub fn not_ready(state: impl ToString) -> Self {
        Self::TransportNotReady {
            state: state.to_string(),
        }
    }
}
