//! Name and pattern matching strategies.
//!
//! Both document walkers funnel through these two functions: name matching
//! decides whether an identifier owns a sensitive value, pattern matching
//! rewrites sensitive substrings inside a value.

use crate::policy::RedactPattern;
use regex::NoExpand;

/// Decide whether `identifier` names a sensitive value under `pii_names`.
///
/// Matching is case-insensitive substring containment with both sides
/// trimmed. Blank entries are skipped, not treated as errors.
pub(crate) fn is_pii_name(identifier: &str, pii_names: &[String]) -> bool {
    let identifier = identifier.trim().to_lowercase();
    pii_names.iter().any(|name| {
        let name = name.trim();
        !name.is_empty() && identifier.contains(&name.to_lowercase())
    })
}

/// Apply every available pattern to `value` in list order.
///
/// A pattern only runs when the value meets its minimum length, and each
/// substitution sees the output of the previous one, not the original
/// string. Patterns that failed to compile are skipped.
pub(crate) fn apply_patterns(value: &str, patterns: &[RedactPattern]) -> String {
    let mut current = value.to_string();
    for pattern in patterns {
        let Some(regex) = pattern.compiled() else {
            continue;
        };
        if current.len() < pattern.minimum_length {
            continue;
        }
        let placeholder = format!("*REDACTED-{}*", pattern.name);
        current = regex
            .replace_all(&current, NoExpand(&placeholder))
            .into_owned();
    }
    current
}
