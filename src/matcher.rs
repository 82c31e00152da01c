//! Per-field pattern extraction over a chunk of bytes.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// One semantic field of a provider's credential shape: a name, the
/// pattern matching it, and the capture group holding the value.
#[derive(Debug, Clone)]
pub struct FieldPattern {
    pub name: &'static str,
    pub regex: Regex,
    pub group: usize,
}

impl FieldPattern {
    /// Field whose value is capture group 1 of the pattern.
    pub fn capture(name: &'static str, regex: Regex) -> Self {
        Self {
            name,
            regex,
            group: 1,
        }
    }

    /// Field whose value is the whole match.
    pub fn whole(name: &'static str, regex: Regex) -> Self {
        Self {
            name,
            regex,
            group: 0,
        }
    }
}

/// Keyword-anchored prefix for credential patterns: the keyword must
/// appear within 40 characters before the value. Reduces false
/// positives for shapes that are otherwise too generic.
pub fn prefix_regex(keywords: &[&str]) -> String {
    format!(r"(?i:{})(?:.|[\n\r]){{0,40}}?", keywords.join("|"))
}

/// Run every field pattern globally over the chunk and collect the set
/// of distinct trimmed values per field.
///
/// A match missing its designated capture group is skipped. A field
/// with no matches maps to an empty set. Distinct fields may share a
/// pattern; no cross-field deduplication happens here.
pub fn extract_fields(
    data: &str,
    patterns: &[FieldPattern],
) -> BTreeMap<&'static str, BTreeSet<String>> {
    let mut fields: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();

    for pattern in patterns {
        let values = fields.entry(pattern.name).or_default();
        for caps in pattern.regex.captures_iter(data) {
            let Some(m) = caps.get(pattern.group) else {
                // The designated group did not participate in this
                // match; drop the match, not the chunk.
                continue;
            };
            let value = m.as_str().trim();
            if !value.is_empty() {
                values.insert(value.to_string());
            }
        }
    }

    fields
}
