//! Layered error definitions
//!
//! Categorized by source: config / transport / store / archive / attachment

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Transport Errors =====
    /// Transport request failed
    #[error("transport '{transport}' error: {message}")]
    Transport { transport: String, message: String },

    /// Transport session is not connected
    #[error("transport session not ready: {state}")]
    TransportNotReady { state: String },

    // ===== Collaborator Errors =====
    /// Persistent store error
    #[error("store error: {message}")]
    Store { message: String },

    /// History archive error
    #[error("archive error: {message}")]
    Archive { message: String },

    /// Attachment could not be loaded
    #[error("attachment '{filename}' error: {message}")]
    Attachment { filename: String, message: String },

    // ===== Input Errors =====
    /// Caller supplied invalid data
    #[error("invalid input '{field}': {message}")]
    InvalidInput { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create transport error
    pub fn transport(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            transport: transport.into(),
            message: message.into(),
        }
    }

    /// Create store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create archive error
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Create attachment error
    pub fn attachment(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attachment {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create invalid input error
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }
}
