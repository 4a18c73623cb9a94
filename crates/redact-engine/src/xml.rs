//! XML tree walker.
//!
//! XML documents are pulled into an owned node tree with `quick-xml`,
//! rewritten in place, and re-serialized through an explicit escaping
//! writer. The tree shape never changes: only attribute values, text,
//! CDATA, and comment contents are mutated.

use crate::detect::DocumentFormat;
use crate::engine::Redactor;
use crate::matcher::is_pii_name;
use crate::{RedactionError, Result};
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One node of a parsed XML document.
#[derive(Debug, Clone, PartialEq)]
enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    /// Declaration, doctype, and processing instructions are carried through
    /// verbatim (content between the markers, markers re-added on write).
    Decl(String),
    DocType(String),
    Pi(String),
}

#[derive(Debug, Clone, PartialEq)]
struct XmlElement {
    /// Qualified name as written in the document.
    name: String,
    attributes: Vec<XmlAttribute>,
    children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq)]
struct XmlAttribute {
    name: String,
    value: String,
}

pub(crate) struct XmlWalker<'a> {
    engine: &'a Redactor,
}

impl<'a> XmlWalker<'a> {
    pub(crate) fn new(engine: &'a Redactor) -> Self {
        Self { engine }
    }

    /// Parse, walk, and re-serialize an XML document.
    pub(crate) fn redact(&self, xml: &str) -> Result<String> {
        let mut nodes = parse(xml)?;
        for node in &mut nodes {
            self.walk(node);
        }
        let mut out = String::new();
        for node in &nodes {
            write_node(node, &mut out);
        }
        Ok(out)
    }

    fn walk(&self, node: &mut XmlNode) {
        match node {
            XmlNode::Element(element) => self.walk_element(element),
            // Top-level text and comments outside any element.
            XmlNode::Text(value) | XmlNode::CData(value) | XmlNode::Comment(value) => {
                *value = self.engine.redacted_leaf(value, false, DocumentFormat::Xml);
            }
            _ => {}
        }
    }

    fn walk_element(&self, element: &mut XmlElement) {
        let policy = self.engine.policy();
        for attribute in &mut element.attributes {
            let by_name = policy.by_name()
                && is_pii_name(local_name(&attribute.name), &policy.redact_names);
            let redacted = self
                .engine
                .redacted_leaf(&attribute.value, by_name, DocumentFormat::Xml);
            attribute.value = redacted;
        }

        // PII-parent cascade: text directly under a PII-named element is
        // redacted by that name, whether it is the element's single value or
        // part of mixed content.
        let cascade =
            policy.by_name() && is_pii_name(local_name(&element.name), &policy.redact_names);
        for child in &mut element.children {
            match child {
                XmlNode::Element(child_element) => self.walk_element(child_element),
                XmlNode::Text(value) | XmlNode::CData(value) => {
                    *value = self.engine.redacted_leaf(value, cascade, DocumentFormat::Xml);
                }
                XmlNode::Comment(value) => {
                    *value = self.engine.redacted_leaf(value, false, DocumentFormat::Xml);
                }
                _ => {}
            }
        }
    }
}

/// Local part of a qualified name: `ns:Name` matches as `Name`.
fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn parse(xml: &str) -> Result<Vec<XmlNode>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut roots = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                push_node(&mut stack, &mut roots, XmlNode::Element(element));
            }
            Event::End(_) => {
                // The reader has already checked that the end tag matches.
                let element = stack.pop().ok_or_else(|| {
                    RedactionError::MalformedXml("unexpected end tag".to_string())
                })?;
                push_node(&mut stack, &mut roots, XmlNode::Element(element));
            }
            Event::Text(text) => {
                let value = unescape_bytes(&text)?;
                if !value.is_empty() {
                    push_node(&mut stack, &mut roots, XmlNode::Text(value));
                }
            }
            Event::CData(data) => {
                let value = String::from_utf8_lossy(&data).into_owned();
                push_node(&mut stack, &mut roots, XmlNode::CData(value));
            }
            Event::Comment(comment) => {
                let value = String::from_utf8_lossy(&comment).into_owned();
                push_node(&mut stack, &mut roots, XmlNode::Comment(value));
            }
            Event::Decl(decl) => {
                let content = String::from_utf8_lossy(&decl).into_owned();
                push_node(&mut stack, &mut roots, XmlNode::Decl(content));
            }
            Event::DocType(doctype) => {
                let content = String::from_utf8_lossy(&doctype).into_owned();
                push_node(&mut stack, &mut roots, XmlNode::DocType(content));
            }
            Event::PI(pi) => {
                let content = String::from_utf8_lossy(&pi).into_owned();
                push_node(&mut stack, &mut roots, XmlNode::Pi(content));
            }
            Event::Eof => break,
        }
    }

    if let Some(element) = stack.last() {
        return Err(RedactionError::MalformedXml(format!(
            "element \"{}\" is never closed",
            element.name
        )));
    }
    let root_elements = roots
        .iter()
        .filter(|node| matches!(node, XmlNode::Element(_)))
        .count();
    if root_elements == 0 {
        return Err(RedactionError::MalformedXml(
            "document has no root element".to_string(),
        ));
    }
    if root_elements > 1 {
        return Err(RedactionError::MalformedXml(
            "document has more than one root element".to_string(),
        ));
    }
    Ok(roots)
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|error| RedactionError::MalformedXml(error.to_string()))?;
        attributes.push(XmlAttribute {
            name: String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            value: unescape_bytes(&attribute.value)?,
        });
    }
    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}

fn push_node(stack: &mut Vec<XmlElement>, roots: &mut Vec<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn unescape_bytes(bytes: &[u8]) -> Result<String> {
    let raw = String::from_utf8_lossy(bytes);
    let unescaped =
        unescape(&raw).map_err(|error| RedactionError::MalformedXml(error.to_string()))?;
    Ok(unescaped.into_owned())
}

fn write_node(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for attribute in &element.attributes {
                out.push(' ');
                out.push_str(&attribute.name);
                out.push_str("=\"");
                out.push_str(&escape(attribute.value.as_str()));
                out.push('"');
            }
            if element.children.is_empty() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in &element.children {
                    write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
        XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
        XmlNode::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        XmlNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        XmlNode::Decl(content) | XmlNode::Pi(content) => {
            out.push_str("<?");
            out.push_str(content);
            out.push_str("?>");
        }
        XmlNode::DocType(content) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(content);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{RedactBy, RedactPattern, RedactionPolicy};
    use crate::Redactor;

    fn name_redactor(names: &[&str]) -> Redactor {
        let mut policy = RedactionPolicy::new(RedactBy::Name);
        policy.redact_names = names.iter().map(|s| s.to_string()).collect();
        Redactor::new(policy).unwrap()
    }

    fn pattern_redactor(patterns: Vec<RedactPattern>) -> Redactor {
        let mut policy = RedactionPolicy::new(RedactBy::Pattern);
        policy.redact_patterns = patterns;
        Redactor::new(policy).unwrap()
    }

    fn email_pattern() -> RedactPattern {
        RedactPattern::new("EMAIL", r"[^@\s]+@[^@\s]+\.[A-Za-z]+", 5)
    }

    #[test]
    fn test_element_text_redacted_by_name() {
        let redactor = name_redactor(&["Email"]);
        let redacted = redactor
            .redact("<root><Email>user@site.com</Email><Age>30</Age></root>")
            .unwrap();
        assert_eq!(
            redacted,
            "<root><Email>*REDACTED-NAME*</Email><Age>30</Age></root>"
        );
    }

    #[test]
    fn test_attribute_redacted_by_local_name() {
        let redactor = name_redactor(&["Email"]);
        let redacted = redactor
            .redact(r#"<user pii:Email="u@s.com" id="5"/>"#)
            .unwrap();
        assert_eq!(redacted, r#"<user pii:Email="*REDACTED-NAME*" id="5"/>"#);
    }

    #[test]
    fn test_pii_element_cascades_into_mixed_content() {
        let redactor = name_redactor(&["Address"]);
        let redacted = redactor
            .redact("<Address>12 Elm St<note/>Apt 4</Address>")
            .unwrap();
        assert_eq!(
            redacted,
            "<Address>*REDACTED-NAME*<note/>*REDACTED-NAME*</Address>"
        );
    }

    #[test]
    fn test_pattern_redaction_in_text_and_comment() {
        let redactor = pattern_redactor(vec![email_pattern()]);
        let redacted = redactor
            .redact("<root><!-- reach me at u@s.com --><v>mail u@s.com now</v></root>")
            .unwrap();
        assert_eq!(
            redacted,
            "<root><!-- reach me at *REDACTED-EMAIL* --><v>mail *REDACTED-EMAIL* now</v></root>"
        );
    }

    #[test]
    fn test_cdata_redacted_like_text() {
        let redactor = name_redactor(&["Secret"]);
        let redacted = redactor
            .redact("<Secret><![CDATA[top secret]]></Secret>")
            .unwrap();
        assert_eq!(redacted, "<Secret><![CDATA[*REDACTED-NAME*]]></Secret>");
    }

    #[test]
    fn test_declaration_is_preserved() {
        let redactor = name_redactor(&["Name"]);
        let redacted = redactor
            .redact(r#"<?xml version="1.0" encoding="UTF-8"?><root><Name>x</Name></root>"#)
            .unwrap();
        assert!(redacted.starts_with("<?xml"));
        assert!(redacted.contains("<Name>*REDACTED-NAME*</Name>"));
    }

    #[test]
    fn test_escaped_text_round_trips() {
        let redactor = name_redactor(&["Nothing"]);
        let redacted = redactor
            .redact("<root><v>a &lt; b &amp; c</v></root>")
            .unwrap();
        assert_eq!(redacted, "<root><v>a &lt; b &amp; c</v></root>");
    }

    #[test]
    fn test_embedded_json_text_is_redacted_as_json() {
        let redactor = name_redactor(&["Name"]);
        let redacted = redactor
            .redact(r#"<root><data>{"Name":"John","Age":30}</data></root>"#)
            .unwrap();
        assert_eq!(
            redacted,
            r#"<root><data>{"Name":"*REDACTED-NAME*","Age":30}</data></root>"#
        );
    }

    #[test]
    fn test_unclosed_element_is_rejected() {
        let redactor = name_redactor(&["Name"]);
        assert!(redactor.redact("<root><Name>x</Name>").is_err());
    }

    #[test]
    fn test_multiple_root_elements_are_rejected() {
        let redactor = name_redactor(&["Name"]);
        assert!(redactor.redact("<a/><b/>").is_err());
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("ns:Email"), "Email");
        assert_eq!(local_name("Email"), "Email");
    }
}
