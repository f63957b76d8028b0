//! Auto-reply rules (keyword-triggered replies to inbound messages)

use serde::{Deserialize, Serialize};

/// Stored auto-reply rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReplyRule {
    pub id: i64,
    /// Normalized trigger text
    pub trigger: String,
    /// Reply body
    pub message: String,
}

/// Normalize a trigger or inbound text for exact matching
///
/// Trims, drops `'`, `"` and `;`, lowercases.
pub fn normalize_trigger(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';'))
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trigger() {
        assert_eq!(normalize_trigger("  Info PMB  "), "info pmb");
        assert_eq!(normalize_trigger("'Harga';"), "harga");
        assert_eq!(normalize_trigger("\"HELLO\""), "hello");
        assert_eq!(normalize_trigger("   "), "");
    }
}
