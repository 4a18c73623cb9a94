//! The redaction engine facade.
//!
//! Dispatches an input string to the JSON or XML walker based on its edge
//! characters, and hosts the leaf-value redaction shared by both walkers,
//! including the cross-format re-entry that lets a JSON blob embedded in an
//! XML text node (or the reverse) be redacted as its own document.

use crate::detect::{self, DocumentFormat};
use crate::json::JsonWalker;
use crate::matcher;
use crate::policy::RedactionPolicy;
use crate::xml::XmlWalker;
use crate::{RedactionError, Result};
use tracing::debug;

/// Redacts serialized JSON and XML documents according to a policy.
///
/// A `Redactor` is cheap to share: the policy is read-only and compiled
/// regexes are cached build-once, so independent `redact` calls may run
/// concurrently from separate threads. Each call owns its parsed document
/// tree exclusively and discards it after serialization.
#[derive(Debug)]
pub struct Redactor {
    policy: RedactionPolicy,
}

impl Redactor {
    /// Create a redactor, validating the policy invariants.
    pub fn new(policy: RedactionPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    /// The policy this redactor applies.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }

    /// Redact a serialized JSON or XML document.
    ///
    /// Fails when the trimmed input is empty, has neither XML nor JSON edge
    /// characters, or has edges but does not parse as that format.
    pub fn redact(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if text.is_empty() {
            return Err(RedactionError::EmptyInput);
        }
        match detect::detect(text) {
            Some(DocumentFormat::Xml) => self.redact_xml(text),
            Some(DocumentFormat::Json) => self.redact_json(text),
            None => Err(RedactionError::UnrecognizedFormat),
        }
    }

    pub(crate) fn redact_json(&self, json: &str) -> Result<String> {
        JsonWalker::new(self).redact(json.trim())
    }

    pub(crate) fn redact_xml(&self, xml: &str) -> Result<String> {
        XmlWalker::new(self).redact(xml.trim())
    }

    /// Compute the replacement for one leaf string value.
    ///
    /// Name redaction wins over everything else; next, an embedded document
    /// of the other format is redacted as a whole; otherwise patterns run
    /// when the policy enables them. At most one placeholder kind is applied
    /// per value per visit.
    pub(crate) fn redacted_leaf(
        &self,
        value: &str,
        redact_by_name: bool,
        host: DocumentFormat,
    ) -> String {
        if value.is_empty() {
            return String::new();
        }
        if redact_by_name {
            return self.policy.name_redact_value.clone();
        }
        if let Some(redacted) = self.redact_embedded(value, host) {
            return redacted;
        }
        if self.policy.by_pattern() {
            return matcher::apply_patterns(value, &self.policy.redact_patterns);
        }
        value.to_string()
    }

    /// Cross-format re-entry: redact a leaf that is itself a serialized
    /// document of the other format. The embedded string is re-parsed into
    /// an independent tree; any parse or redaction failure falls back to
    /// plain handling of the literal value.
    fn redact_embedded(&self, value: &str, host: DocumentFormat) -> Option<String> {
        match host {
            DocumentFormat::Xml if detect::has_json_edges(value) => {
                match self.redact_json(value) {
                    Ok(redacted) => Some(redacted),
                    Err(error) => {
                        debug!(%error, "embedded JSON leaf did not redact, falling back");
                        None
                    }
                }
            }
            DocumentFormat::Json if detect::has_xml_edges(value) => {
                match self.redact_xml(value) {
                    Ok(redacted) => Some(redacted),
                    Err(error) => {
                        debug!(%error, "embedded XML leaf did not redact, falling back");
                        None
                    }
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{RedactBy, RedactPattern};

    fn name_redactor() -> Redactor {
        let mut policy = RedactionPolicy::new(RedactBy::Name);
        policy.redact_names.push("Name".to_string());
        Redactor::new(policy).unwrap()
    }

    #[test]
    fn test_redact_dispatches_on_edges() {
        let redactor = name_redactor();

        let json = redactor.redact(r#"{"Name":"John"}"#).unwrap();
        assert_eq!(json, r#"{"Name":"*REDACTED-NAME*"}"#);

        let xml = redactor.redact("<Name>John</Name>").unwrap();
        assert_eq!(xml, "<Name>*REDACTED-NAME*</Name>");
    }

    #[test]
    fn test_redact_trims_input() {
        let redactor = name_redactor();
        let json = redactor.redact("  {\"Name\":\"John\"}\n").unwrap();
        assert_eq!(json, r#"{"Name":"*REDACTED-NAME*"}"#);
    }

    #[test]
    fn test_redact_rejects_empty_input() {
        let redactor = name_redactor();
        assert!(matches!(
            redactor.redact("   "),
            Err(RedactionError::EmptyInput)
        ));
    }

    #[test]
    fn test_redact_rejects_unrecognized_format() {
        let redactor = name_redactor();
        assert!(matches!(
            redactor.redact("Not XML or JSON"),
            Err(RedactionError::UnrecognizedFormat)
        ));
    }

    #[test]
    fn test_redact_rejects_malformed_json() {
        let redactor = name_redactor();
        assert!(matches!(
            redactor.redact("{Not JSON}}"),
            Err(RedactionError::Json(_))
        ));
    }

    #[test]
    fn test_redact_rejects_malformed_xml() {
        let redactor = name_redactor();
        let result = redactor.redact("<Not XML>>");
        assert!(matches!(
            result,
            Err(RedactionError::Xml(_)) | Err(RedactionError::MalformedXml(_))
        ));
    }

    #[test]
    fn test_new_rejects_invalid_policy() {
        let mut policy = RedactionPolicy::new(RedactBy::Pattern);
        policy.redact_patterns.push(RedactPattern::new("", r"\d+", 0));
        assert!(Redactor::new(policy).is_err());
    }

    #[test]
    fn test_mode_none_passes_document_through() {
        let redactor = Redactor::new(RedactionPolicy::new(RedactBy::None)).unwrap();
        let redacted = redactor.redact(r#"{"Name":"John","Age":30}"#).unwrap();
        assert_eq!(redacted, r#"{"Name":"John","Age":30}"#);
    }

    #[test]
    fn test_redacted_leaf_name_wins_over_pattern() {
        let mut policy = RedactionPolicy::new(RedactBy::NameAndPattern);
        policy.redact_names.push("Name".to_string());
        policy
            .redact_patterns
            .push(RedactPattern::new("ANY", r".+", 0));
        let redactor = Redactor::new(policy).unwrap();

        let redacted = redactor.redacted_leaf("John", true, DocumentFormat::Json);
        assert_eq!(redacted, "*REDACTED-NAME*");
    }

    #[test]
    fn test_redacted_leaf_empty_value_unchanged() {
        let redactor = name_redactor();
        assert_eq!(redactor.redacted_leaf("", true, DocumentFormat::Json), "");
    }
}
