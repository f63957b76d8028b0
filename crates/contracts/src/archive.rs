//! HistoryArchive trait - external chat-history service interface

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Payload of one archive call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// First campaign tag
    pub identity: String,
    /// Second campaign tag
    pub pmb: String,
    /// Destination in archive format (digits with country code)
    pub phone: String,
    /// Campaign title
    pub title: String,
    /// Rendered message
    pub result: String,
}

/// History archive trait
#[trait_variant::make(HistoryArchive: Send)]
pub trait LocalHistoryArchive {
    /// Store one rendered message
    async fn archive(&self, entry: &ArchiveEntry) -> Result<(), ContractError>;
}
