//! Destination address formatting
//!
//! Operators type local numbers ("0812..."); the transport and the history
//! archive want international digits.

use contracts::SENTINEL_ADDRESS;

/// Suffix the transport expects on individual chat ids
pub const CHAT_ID_SUFFIX: &str = "@c.us";

/// Converts raw recipient addresses into transport / archive form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressFormatter {
    country_code: String,
}

impl AddressFormatter {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
        }
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// Digits only, leading `0` replaced by the country code
    pub fn international(&self, address: &str) -> String {
        let digits: String = address.chars().filter(char::is_ascii_digit).collect();
        match digits.strip_prefix('0') {
            Some(rest) => format!("{}{}", self.country_code, rest),
            None => digits,
        }
    }

    /// Transport chat id (`<digits>@c.us`)
    pub fn chat_id(&self, address: &str) -> String {
        format!("{}{}", self.international(address), CHAT_ID_SUFFIX)
    }

    /// Phone value sent to the history archive
    pub fn archive_phone(&self, address: &str) -> String {
        self.international(address)
    }

    /// Archive form of the sentinel address
    pub fn sentinel_phone(&self) -> String {
        self.international(SENTINEL_ADDRESS)
    }
}

impl Default for AddressFormatter {
    fn default() -> Self {
        Self::new("62")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_replaced() {
        let f = AddressFormatter::default();
        assert_eq!(f.international("081234567890"), "6281234567890");
        assert_eq!(f.chat_id("081234567890"), "6281234567890@c.us");
    }

    #[test]
    fn test_non_digits_stripped() {
        let f = AddressFormatter::default();
        assert_eq!(f.international("+62 812-3456-7890"), "6281234567890");
    }

    #[test]
    fn test_international_kept() {
        let f = AddressFormatter::new("1");
        assert_eq!(f.international("15551234567"), "15551234567");
        assert_eq!(f.international("05551234567"), "15551234567");
    }

    #[test]
    fn test_sentinel_phone() {
        assert_eq!(AddressFormatter::default().sentinel_phone(), "62000000000");
        assert_eq!(
            AddressFormatter::default().archive_phone(SENTINEL_ADDRESS),
            "62000000000"
        );
    }
}
