//! ObserverEvent - live progress events relayed to observers

use serde::{Serialize, Serializer};

/// Severity carried by `info` events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoStatus {
    /// Campaign-level problem
    Error,
    /// Normal progress
    Success,
}

impl InfoStatus {
    /// Numeric code understood by observer front-ends
    pub fn code(self) -> u8 {
        match self {
            InfoStatus::Error => 1,
            InfoStatus::Success => 3,
        }
    }
}

impl Serialize for InfoStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Named event delivered to every connected observer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Free-form log line
    Logging(String),

    /// Human-readable status message
    Info { status: InfoStatus, message: String },

    /// Progress counter (1-based position, total recipients)
    Percent { counter: usize, total: usize },

    /// A transport send succeeded
    Send(bool),
}

impl ObserverEvent {
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging(message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            status: InfoStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Info {
            status: InfoStatus::Error,
            message: message.into(),
        }
    }

    pub fn percent(counter: usize, total: usize) -> Self {
        Self::Percent { counter, total }
    }

    /// Event name as seen by observers
    pub fn name(&self) -> &'static str {
        match self {
            ObserverEvent::Logging(_) => "logging",
            ObserverEvent::Info { .. } => "info",
            ObserverEvent::Percent { .. } => "percent",
            ObserverEvent::Send(_) => "send",
        }
    }
}
