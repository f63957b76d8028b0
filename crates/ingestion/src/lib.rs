//! # Ingestion
//!
//! Recipient list ingestion module.
//!
//! Responsibilities:
//! - Parse raw line-oriented text into `RecipientRecord`s
//! - Normalize missing / short addresses to the sentinel
//! - Format addresses for the transport and the history archive
//!
//! ## Usage Example
//!
//! ```
//! use ingestion::{parse_recipients, AddressFormatter};
//!
//! let records = parse_recipients("Alice,081234567890\nBob\n");
//! assert_eq!(records.len(), 2);
//!
//! let formatter = AddressFormatter::new("62");
//! assert_eq!(formatter.chat_id(&records[0].address), "6281234567890@c.us");
//! ```

mod address;
mod error;
mod parser;
mod source;

// Re-exports
pub use address::{AddressFormatter, CHAT_ID_SUFFIX};
pub use contracts::{RecipientRecord, SENTINEL_ADDRESS};
pub use error::{IngestionError, Result};
pub use parser::{
    classify_line, parse_line, parse_recipients, parse_with_summary, LineRule, ParseSummary,
};
pub use source::{read_raw, read_recipients};
