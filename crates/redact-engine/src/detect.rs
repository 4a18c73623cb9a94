//! Format detection over document edge characters.
//!
//! Classification is a pure heuristic: it looks only at the leading and
//! trailing delimiters of a trimmed string. The parse that follows still
//! decides whether the document is actually well formed.

const XML_START: char = '<';
const XML_END: char = '>';
const JSON_OBJECT_START: char = '{';
const JSON_OBJECT_END: char = '}';
const JSON_ARRAY_START: char = '[';
const JSON_ARRAY_END: char = ']';

/// Serialized document formats the engine can redact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Xml,
}

/// Classify a trimmed string by its edges. XML wins over JSON, and an empty
/// string matches neither.
pub fn detect(value: &str) -> Option<DocumentFormat> {
    if has_xml_edges(value) {
        Some(DocumentFormat::Xml)
    } else if has_json_edges(value) {
        Some(DocumentFormat::Json)
    } else {
        None
    }
}

/// True if `value` starts with `<` and ends with `>`.
pub fn has_xml_edges(value: &str) -> bool {
    has_edges(value, XML_START, XML_END)
}

/// True if `value` has JSON object or JSON array edges.
pub fn has_json_edges(value: &str) -> bool {
    has_json_object_edges(value) || has_json_array_edges(value)
}

/// True if `value` starts with `{` and ends with `}`.
pub fn has_json_object_edges(value: &str) -> bool {
    has_edges(value, JSON_OBJECT_START, JSON_OBJECT_END)
}

/// True if `value` starts with `[` and ends with `]`.
pub fn has_json_array_edges(value: &str) -> bool {
    has_edges(value, JSON_ARRAY_START, JSON_ARRAY_END)
}

fn has_edges(value: &str, start: char, end: char) -> bool {
    value.starts_with(start) && value.ends_with(end)
}
