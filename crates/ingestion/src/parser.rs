//! Recipient list parser
//!
//! One input line produces exactly one [`RecipientRecord`], in input order.
//! Normalization, first match wins:
//! 1. two or more fields with a non-blank name: keep them, replacing an
//!    address shorter than [`MIN_ADDRESS_LEN`] with the sentinel
//! 2. a single non-empty field: it is the name, address is the sentinel
//! 3. anything else (blank line, blank name): `{"undefined", sentinel}`
//!
//! The address length is measured on the field as typed, surrounding
//! spaces included; the kept value is trimmed. Names are trimmed.
//! A final line terminator does not open a new line.

use contracts::{RecipientRecord, MIN_ADDRESS_LEN, SENTINEL_ADDRESS};
use tracing::{debug, instrument};

const FIELD_SEPARATOR: char = ',';

/// Normalization rule that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    /// Name and address (plus extras) taken from the line
    Fields,
    /// Name only, sentinel address
    NameOnly,
    /// Blank or malformed line, synthesized placeholder
    Placeholder,
}

/// Parse raw recipient text into normalized records
pub fn parse_recipients(raw: &str) -> Vec<RecipientRecord> {
    parse_with_summary(raw).0
}

/// Parse raw recipient text, counting what each rule produced
#[instrument(name = "ingestion_parse_recipients", skip(raw), fields(bytes = raw.len()))]
pub fn parse_with_summary(raw: &str) -> (Vec<RecipientRecord>, ParseSummary) {
    let mut summary = ParseSummary::default();
    let records: Vec<RecipientRecord> = raw
        .lines()
        .map(|line| {
            let (record, rule) = classify_line(line);
            summary.add(&record, rule);
            record
        })
        .collect();
    debug!(
        records = records.len(),
        placeholders = summary.placeholders,
        "recipient list parsed"
    );
    (records, summary)
}

/// Normalize a single line
pub fn parse_line(line: &str) -> RecipientRecord {
    classify_line(line).0
}

/// Normalize a single line and report the rule that fired
pub fn classify_line(line: &str) -> (RecipientRecord, LineRule) {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();

    match fields.as_slice() {
        [name, address, extras @ ..] if !name.trim().is_empty() => (
            RecipientRecord::new(name.trim(), normalize_address(address))
                .with_extras(extras.iter().map(|v| v.to_string()).collect()),
            LineRule::Fields,
        ),
        [name] if !name.trim().is_empty() => (
            RecipientRecord::new(name.trim(), SENTINEL_ADDRESS),
            LineRule::NameOnly,
        ),
        _ => (RecipientRecord::placeholder(), LineRule::Placeholder),
    }
}

fn normalize_address(raw: &str) -> String {
    let address = raw.trim();
    if raw.chars().count() < MIN_ADDRESS_LEN || address.is_empty() {
        SENTINEL_ADDRESS.to_string()
    } else {
        address.to_string()
    }
}

/// Parse statistics, for operator feedback before a campaign starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseSummary {
    /// Total records (== input lines)
    pub total: usize,
    /// Records synthesized from blank or malformed lines
    pub placeholders: usize,
    /// Records whose address fell back to the sentinel
    pub sentinel_addresses: usize,
}

impl ParseSummary {
    fn add(&mut self, record: &RecipientRecord, rule: LineRule) {
        self.total += 1;
        if rule == LineRule::Placeholder {
            self.placeholders += 1;
        }
        if record.has_sentinel_address() {
            self.sentinel_addresses += 1;
        }
    }

    /// Records that have a plausible destination
    pub fn addressable(&self) -> usize {
        self.total - self.sentinel_addresses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_fields_kept() {
        let r = parse_line("Alice,5551234567");
        assert_eq!(r, RecipientRecord::new("Alice", "5551234567"));
    }

    #[test]
    fn test_short_address_replaced_by_sentinel() {
        for line in ["Bob,123", "Bob,", "Bob,555123456"] {
            let r = parse_line(line);
            assert_eq!(r.name, "Bob");
            assert_eq!(r.address, SENTINEL_ADDRESS, "line: {line}");
        }
    }

    #[test]
    fn test_extra_fields_become_extras() {
        let r = parse_line("Jane Doe,081234567890,X1,Batch 7");
        assert_eq!(r.address, "081234567890");
        assert_eq!(r.extras, vec!["X1".to_string(), "Batch 7".to_string()]);
    }

    #[test]
    fn test_single_field_gets_sentinel() {
        let r = parse_line("Bob");
        assert_eq!(r, RecipientRecord::new("Bob", SENTINEL_ADDRESS));
    }

    #[test]
    fn test_blank_and_malformed_lines_become_placeholders() {
        for line in ["", "   ", ",9998887776", " ,123"] {
            assert_eq!(parse_line(line), RecipientRecord::placeholder(), "line: {line:?}");
        }
    }

    #[test]
    fn test_one_record_per_line_in_order() {
        let raw = "Alice,5551234567\nBob\n,9998887776\n";
        let records = parse_recipients(raw);
        assert_eq!(
            records,
            vec![
                RecipientRecord::new("Alice", "5551234567"),
                RecipientRecord::new("Bob", SENTINEL_ADDRESS),
                RecipientRecord::placeholder(),
            ]
        );
    }

    #[test]
    fn test_interior_blank_line_is_kept() {
        let records = parse_recipients("Alice,5551234567\n\nCarol,5559876543");
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], RecipientRecord::placeholder());
        assert_eq!(records[2].name, "Carol");
    }

    #[test]
    fn test_crlf_input() {
        let records = parse_recipients("Alice,5551234567\r\nBob,5550001111\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].address, "5551234567");
        assert_eq!(records[1].address, "5550001111");
    }

    #[test]
    fn test_address_never_empty() {
        let raw = "a,\n,\n\n,,,\nb,1\nc,12345678901,\n";
        for r in parse_recipients(raw) {
            assert!(!r.address.is_empty());
        }
    }

    #[test]
    fn test_summary() {
        let (records, summary) = parse_with_summary("Alice,5551234567\nBob\n\n");
        assert_eq!(records.len(), 3);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.placeholders, 1);
        assert_eq!(summary.sentinel_addresses, 2);
        assert_eq!(summary.addressable(), 1);
    }

    #[test]
    fn test_literal_undefined_name_is_not_a_placeholder() {
        let (records, summary) = parse_with_summary("undefined\nBob,0812345678901");
        assert_eq!(records[0], RecipientRecord::placeholder());
        assert_eq!(classify_line("undefined").1, LineRule::NameOnly);
        assert_eq!(summary.placeholders, 0);
        assert_eq!(summary.sentinel_addresses, 1);
    }

    #[test]
    fn test_address_length_counts_spaces_as_typed() {
        // 10 characters as typed, 9 digits
        let r = parse_line("Ann, 081234567");
        assert_eq!(r.name, "Ann");
        assert_eq!(r.address, "081234567");

        let r = parse_line("  Ann  ,081234567");
        assert_eq!(r.name, "Ann");
        assert_eq!(r.address, SENTINEL_ADDRESS);

        // long but blank
        assert_eq!(parse_line("Ann,            ").address, SENTINEL_ADDRESS);
    }
}
