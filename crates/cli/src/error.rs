//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Template file unreadable or template empty
    #[error("Invalid message template: {message}")]
    Template { message: String },

    /// Attachment file could not be read
    #[error("Failed to read attachment '{path}': {source}")]
    AttachmentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Broadcast rejected at submission
    #[error("Broadcast rejected: {message}")]
    Rejected { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}
