//! Substitution engine
//!
//! Single pass, left to right: at each position the longest bound token wins
//! and inserted values are never rescanned, so a value that happens to look
//! like a token stays literal. Matching is case-sensitive.

use aho_corasick::{AhoCorasickBuilder, MatchKind};
use contracts::RecipientRecord;
use tracing::warn;

use crate::binding::VariableBinding;

/// Render `template` for one recipient
pub fn render(template: &str, record: &RecipientRecord) -> String {
    substitute(template, &VariableBinding::from_record(record))
}

/// Replace every bound token in `template`; unbound tokens are left as-is
pub fn substitute(template: &str, binding: &VariableBinding) -> String {
    if binding.is_empty() || !template.contains('&') {
        return template.to_string();
    }

    let patterns: Vec<&str> = binding.tokens().collect();
    let automaton = match AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&patterns)
    {
        Ok(ac) => ac,
        Err(e) => {
            warn!(
                tokens = patterns.len(),
                error = %e,
                "token automaton build failed; template sent unrendered"
            );
            return template.to_string();
        }
    };

    let mut rendered = String::with_capacity(template.len());
    automaton.replace_all_with(template, &mut rendered, |m, _, dst| {
        dst.push_str(binding.value_at(m.pattern().as_usize()));
        true
    });
    rendered
}

/// Token-like sequences (`&` followed by ASCII alphanumerics) in a template
///
/// Used to warn about tokens a recipient cannot fill.
pub fn referenced_tokens(template: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut rest = template;
    while let Some(pos) = rest.find('&') {
        let after = &rest[pos + 1..];
        let len = after
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(after.len());
        if len > 0 {
            let token = format!("&{}", &after[..len]);
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        rest = &after[len..];
    }
    tokens
}

/// Referenced tokens the record leaves unbound
pub fn unbound_tokens(template: &str, record: &RecipientRecord) -> Vec<String> {
    let binding = VariableBinding::from_record(record);
    referenced_tokens(template)
        .into_iter()
        .filter(|t| binding.get(t).is_none())
        .collect()
}
