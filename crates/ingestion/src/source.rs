//! Recipient list loading from files

use std::path::Path;

use contracts::RecipientRecord;
use tracing::{info, instrument};

use crate::error::{IngestionError, Result};
use crate::parser::parse_with_summary;

/// Read a recipient file (one `name,address[,extra...]` per line)
#[instrument(name = "ingestion_read_recipients", fields(path = %path.display()))]
pub fn read_recipients(path: &Path) -> Result<Vec<RecipientRecord>> {
    let raw = read_raw(path)?;
    let (records, summary) = parse_with_summary(&raw);
    if records.is_empty() {
        return Err(IngestionError::Empty {
            path: path.display().to_string(),
        });
    }

    info!(
        total = summary.total,
        placeholders = summary.placeholders,
        sentinel_addresses = summary.sentinel_addresses,
        "recipient list loaded"
    );
    Ok(records)
}

/// Read the raw text without parsing (campaign submission takes raw text)
pub fn read_raw(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| IngestionError::ReadFailed {
        path: path.display().to_string(),
        source,
    })
}
