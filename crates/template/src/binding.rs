//! VariableBinding - token -> value mapping for one recipient

use contracts::RecipientRecord;

/// Full display name
pub const FULLNAME_TOKEN: &str = "&fullname";
/// First word of the display name
pub const FIRSTNAME_TOKEN: &str = "&firstname";
/// Destination address as typed
pub const ADDRESS_TOKEN: &str = "&whatsapp";
/// Prefix of positional extras (`&var1`, `&var2`, ...)
pub const EXTRA_TOKEN_PREFIX: &str = "&var";

/// Token bindings derived from one record
///
/// Built fresh per recipient and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableBinding {
    entries: Vec<(String, String)>,
}

impl VariableBinding {
    /// Bind every token the record can supply
    pub fn from_record(record: &RecipientRecord) -> Self {
        let mut entries = Vec::with_capacity(3 + record.extras.len());
        entries.push((FULLNAME_TOKEN.to_string(), record.name.clone()));
        entries.push((FIRSTNAME_TOKEN.to_string(), record.first_name().to_string()));
        entries.push((ADDRESS_TOKEN.to_string(), record.address.clone()));
        for (idx, value) in record.extras.iter().enumerate() {
            entries.push((extra_token(idx + 1), value.clone()));
        }
        Self { entries }
    }

    /// Value bound to `token`, if any
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, v)| v.as_str())
    }

    /// Bound tokens in binding order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    /// Value at binding position
    pub(crate) fn value_at(&self, idx: usize) -> &str {
        &self.entries[idx].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Token name of the n-th (1-based) positional extra
pub fn extra_token(n: usize) -> String {
    format!("{EXTRA_TOKEN_PREFIX}{n}")
}
