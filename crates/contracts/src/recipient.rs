//! RecipientRecord - Recipient Parser output

use serde::{Deserialize, Serialize};

/// Placeholder address for recipients without a usable destination
pub const SENTINEL_ADDRESS: &str = "0000000000";

/// Display name used for lines that could not be parsed at all
pub const PLACEHOLDER_NAME: &str = "undefined";

/// Minimum length of an address before it is considered plausible
pub const MIN_ADDRESS_LEN: usize = 10;

/// One normalized row of the recipient list
///
/// Immutable after parsing. `address` is never empty: anything missing or
/// too short has already been replaced by [`SENTINEL_ADDRESS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRecord {
    /// Display name (field 0)
    pub name: String,

    /// Destination address (field 1)
    pub address: String,

    /// Extra positional values bound to `&var1`, `&var2`, ...
    #[serde(default)]
    pub extras: Vec<String>,
}

impl RecipientRecord {
    /// Create a record with no extra values
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            extras: Vec::new(),
        }
    }

    /// Attach extra positional values
    pub fn with_extras(mut self, extras: Vec<String>) -> Self {
        self.extras = extras;
        self
    }

    /// Record synthesized for an empty or malformed line
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_NAME, SENTINEL_ADDRESS)
    }

    /// Whether the address is the sentinel placeholder
    pub fn has_sentinel_address(&self) -> bool {
        self.address == SENTINEL_ADDRESS
    }

    /// First whitespace-delimited token of the display name
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}
