//! BroadcastRequest - campaign configuration submitted by the operator

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Campaign configuration
///
/// Created once per submission and immutable for the campaign's duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastRequest {
    /// Message template with `&fullname`-style tokens
    pub template: String,

    /// Optional title / subject label (forwarded to the history archive)
    #[serde(default)]
    pub title: Option<String>,

    /// Optional attachment sent with the rendered text as caption
    #[serde(default)]
    pub attachment: Option<Attachment>,

    /// Pass-through tag used only by the history archive
    #[serde(default)]
    pub identity: String,

    /// Second pass-through tag used only by the history archive
    #[serde(default)]
    pub pmb: String,
}

impl BroadcastRequest {
    /// Create a text-only request
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            title: None,
            attachment: None,
            identity: String::new(),
            pmb: String::new(),
        }
    }

    /// Set the title label
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the attachment
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Set both archive tags
    pub fn with_tags(mut self, identity: impl Into<String>, pmb: impl Into<String>) -> Self {
        self.identity = identity.into();
        self.pmb = pmb.into();
        self
    }

    /// Title or empty string
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

/// Attachment descriptor
///
/// Filename and MIME type are always present together; use [`Attachment::new`]
/// to enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to the receiver
    pub filename: String,

    /// MIME type (e.g. "image/png")
    pub mime_type: String,

    /// Where the binary content comes from
    pub source: AttachmentSource,
}

impl Attachment {
    /// Create an attachment, rejecting blank filename or MIME type
    pub fn new(
        filename: impl Into<String>,
        mime_type: impl Into<String>,
        source: AttachmentSource,
    ) -> Result<Self, ContractError> {
        let filename = filename.into();
        let mime_type = mime_type.into();
        if filename.trim().is_empty() {
            return Err(ContractError::invalid_input(
                "attachment.filename",
                "filename is required when an attachment is present",
            ));
        }
        if mime_type.trim().is_empty() {
            return Err(ContractError::invalid_input(
                "attachment.mime_type",
                "MIME type is required when an attachment is present",
            ));
        }
        Ok(Self {
            filename,
            mime_type,
            source,
        })
    }
}

/// Attachment content reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum AttachmentSource {
    /// Base64 content, optionally wrapped in a `data:` URL
    Inline(String),
    /// Remote http(s) location fetched on demand
    Url(String),
}

/// Loaded attachment ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaPayload {
    pub filename: String,
    pub mime_type: String,
    pub data: Bytes,
}
