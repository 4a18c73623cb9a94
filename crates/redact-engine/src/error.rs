//! Error types for the redaction engine.

use thiserror::Error;

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactionError>;

/// Errors that can occur while building a redactor or redacting a document.
///
/// Cross-format recursion failures and patterns that fail to compile are not
/// errors: they degrade to pattern-based or no-op handling of the value.
#[derive(Error, Debug)]
pub enum RedactionError {
    /// Input text was empty or whitespace-only.
    #[error("input text is empty")]
    EmptyInput,

    /// Input text has neither XML nor JSON edge characters.
    #[error("input text must be in either valid XML or valid JSON format")]
    UnrecognizedFormat,

    /// Input had JSON edges but failed to parse as JSON.
    #[error("unable to parse input as JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Input had XML edges but failed to parse as XML.
    #[error("unable to parse input as XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Input had XML edges but its markup is not well formed.
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// The redaction policy violates an invariant.
    #[error("policy error: {0}")]
    Policy(String),

    /// I/O error while reading or writing a policy file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
