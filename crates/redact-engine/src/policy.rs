//! Redaction policy configuration.
//!
//! The policy says how redaction happens: by property name, by value pattern,
//! or both, together with the placeholder used for name matches and the
//! ordered list of value patterns.

use crate::{RedactionError, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Default replacement for values redacted by name matching.
pub const DEFAULT_NAME_REDACT_VALUE: &str = "*REDACTED-NAME*";

fn default_name_redact_value() -> String {
    DEFAULT_NAME_REDACT_VALUE.to_string()
}

fn default_match_timeout_ms() -> u64 {
    250
}

/// The strategy by which values are redacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RedactBy {
    /// No redaction; documents pass through unchanged apart from formatting.
    #[default]
    None,

    /// Redact by matching property names.
    Name,

    /// Redact by matching values to patterns.
    Pattern,

    /// Redact by matching property names and by matching values to patterns.
    NameAndPattern,
}

impl RedactBy {
    /// True when name matching participates.
    pub fn by_name(self) -> bool {
        matches!(self, RedactBy::Name | RedactBy::NameAndPattern)
    }

    /// True when pattern matching participates.
    pub fn by_pattern(self) -> bool {
        matches!(self, RedactBy::Pattern | RedactBy::NameAndPattern)
    }
}

/// A single value pattern: every match of `pattern` inside a value is
/// replaced with the literal `*REDACTED-{name}*`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactPattern {
    /// Name of the pattern, embedded in the replacement placeholder.
    pub name: String,

    /// Regex source the value is matched against.
    pub pattern: String,

    /// Minimum value length required before the pattern is tried.
    #[serde(default)]
    pub minimum_length: usize,

    /// Per-pattern matching budget in milliseconds. Must be positive.
    #[serde(default = "default_match_timeout_ms")]
    pub match_timeout_ms: u64,

    /// Compiled form, built on first use and reused across calls.
    /// A failed compilation is cached as `None` so the pattern is skipped
    /// without being retried on every value.
    #[serde(skip)]
    compiled: OnceCell<Option<Regex>>,
}

impl RedactPattern {
    /// Create a pattern with the default match timeout.
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        minimum_length: usize,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            minimum_length,
            match_timeout_ms: default_match_timeout_ms(),
            compiled: OnceCell::new(),
        }
    }

    /// The compiled regex, or `None` when the source does not compile.
    pub(crate) fn compiled(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| match Regex::new(&self.pattern) {
                Ok(regex) => Some(regex),
                Err(error) => {
                    warn!(pattern = %self.name, %error, "skipping pattern that failed to compile");
                    None
                }
            })
            .as_ref()
    }
}

/// Redaction policy consumed read-only by the engine.
///
/// A policy is immutable for the duration of a redaction pass; the only
/// interior state is the build-once compiled-regex cache on each pattern,
/// which makes a policy safe to share across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionPolicy {
    /// Whether to redact by name, pattern, or both.
    #[serde(default)]
    pub redact_by: RedactBy,

    /// Value that replaces property values redacted by name matching.
    #[serde(default = "default_name_redact_value")]
    pub name_redact_value: String,

    /// Property, element, and attribute names whose values are redacted when
    /// redacting by name. Matching is case-insensitive substring containment.
    #[serde(default)]
    pub redact_names: Vec<String>,

    /// Ordered patterns applied to values when redacting by pattern.
    #[serde(default)]
    pub redact_patterns: Vec<RedactPattern>,
}

impl RedactionPolicy {
    /// Create an empty policy with the given mode and the default name
    /// placeholder.
    pub fn new(redact_by: RedactBy) -> Self {
        Self {
            redact_by,
            ..Self::default()
        }
    }

    /// Load a policy from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let policy: RedactionPolicy = serde_json::from_str(&content)?;
        Ok(policy)
    }

    /// Save a policy to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// True when name matching participates.
    pub fn by_name(&self) -> bool {
        self.redact_by.by_name()
    }

    /// True when pattern matching participates.
    pub fn by_pattern(&self) -> bool {
        self.redact_by.by_pattern()
    }

    /// Check policy invariants.
    ///
    /// Empty name or pattern lists are allowed and simply never match; what
    /// is rejected is a pattern without a name or source, or a non-positive
    /// match timeout.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.redact_patterns {
            if pattern.name.trim().is_empty() {
                return Err(RedactionError::Policy(
                    "pattern name must not be empty".to_string(),
                ));
            }
            if pattern.pattern.is_empty() {
                return Err(RedactionError::Policy(format!(
                    "pattern \"{}\" has an empty source",
                    pattern.name
                )));
            }
            if pattern.match_timeout_ms == 0 {
                return Err(RedactionError::Policy(format!(
                    "pattern \"{}\" must have a positive match timeout",
                    pattern.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for RedactionPolicy {
    fn default() -> Self {
        Self {
            redact_by: RedactBy::None,
            name_redact_value: default_name_redact_value(),
            redact_names: Vec::new(),
            redact_patterns: Vec::new(),
        }
    }
}
