//! Policy-driven redaction of serialized JSON and XML documents.
//!
//! This crate provides a single, reusable redaction engine: give it a policy
//! (property names to redact by, value patterns to redact by, or both) and a
//! serialized document, and it detects the format, parses the document into
//! a tree, rewrites matching leaf values in place, and re-serializes.
//!
//! # Key Features
//!
//! - **Two matching strategies**: name matching replaces a whole value
//!   because of the property, element, or attribute that owns it; pattern
//!   matching replaces sensitive substrings inside a value.
//! - **PII-parent cascade**: unnamed array elements and child text nodes
//!   inherit the sensitivity of the container that names them.
//! - **Cross-format re-entry**: a JSON blob stored inside an XML text node
//!   (or XML inside a JSON string) is parsed and redacted as its own
//!   document.
//! - **Graceful degradation**: patterns that fail to compile and embedded
//!   documents that fail to parse fall back to plain handling instead of
//!   failing the pass.
//!
//! # Example
//!
//! ```
//! use redact_engine::{RedactBy, RedactionPolicy, Redactor};
//!
//! let mut policy = RedactionPolicy::new(RedactBy::Name);
//! policy.redact_names.push("Name".to_string());
//!
//! let redactor = Redactor::new(policy).unwrap();
//! let redacted = redactor.redact(r#"{"Name":"John","Age":30}"#).unwrap();
//! assert_eq!(redacted, r#"{"Name":"*REDACTED-NAME*","Age":30}"#);
//! ```

pub mod detect;
pub mod engine;
pub mod error;
pub mod policy;

mod json;
mod matcher;
mod xml;

pub use detect::DocumentFormat;
pub use engine::Redactor;
pub use error::{RedactionError, Result};
pub use policy::{RedactBy, RedactPattern, RedactionPolicy, DEFAULT_NAME_REDACT_VALUE};
