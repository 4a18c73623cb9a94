//! JSON tree walker.
//!
//! Walks a parsed `serde_json::Value` and rewrites string leaves in place.
//! The tree shape never changes: no members are added or removed, and
//! non-string scalars pass through untouched.

use crate::detect::DocumentFormat;
use crate::engine::Redactor;
use crate::matcher::is_pii_name;
use crate::Result;
use serde_json::Value;

pub(crate) struct JsonWalker<'a> {
    engine: &'a Redactor,
}

impl<'a> JsonWalker<'a> {
    pub(crate) fn new(engine: &'a Redactor) -> Self {
        Self { engine }
    }

    /// Parse, walk, and re-serialize a JSON document.
    pub(crate) fn redact(&self, json: &str) -> Result<String> {
        let mut root: Value = serde_json::from_str(json)?;
        self.walk(&mut root, false);
        Ok(root.to_string())
    }

    /// Visit a container node. `inherited` carries the PII-parent cascade:
    /// unnamed elements of an array owned by a PII-named property are
    /// redacted by that name, through nested arrays included. The cascade
    /// dies at every named member, so objects always start fresh and their
    /// members are judged on their own names.
    fn walk(&self, node: &mut Value, inherited: bool) {
        let policy = self.engine.policy();
        match node {
            Value::Object(members) => {
                for (name, value) in members.iter_mut() {
                    let by_name =
                        policy.by_name() && is_pii_name(name, &policy.redact_names);
                    match value {
                        Value::Array(_) => self.walk(value, by_name),
                        Value::Object(_) => self.walk(value, false),
                        Value::String(_) => self.redact_leaf(value, by_name),
                        _ => {}
                    }
                }
            }
            Value::Array(elements) => {
                for element in elements.iter_mut() {
                    match element {
                        Value::Array(_) => self.walk(element, inherited),
                        Value::Object(_) => self.walk(element, false),
                        Value::String(_) => self.redact_leaf(element, inherited),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn redact_leaf(&self, leaf: &mut Value, by_name: bool) {
        if let Value::String(value) = leaf {
            let redacted = self
                .engine
                .redacted_leaf(value, by_name, DocumentFormat::Json);
            *value = redacted;
        }
    }
}
