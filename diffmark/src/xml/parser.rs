//! XML parser that builds arena documents.
//!
//! This parser uses quick-xml's streaming API. Whitespace-only text is
//! dropped and runs of whitespace inside text collapse to one space, so text
//! nodes line up with the positions an XML comparator reports.

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::{NodeId, XmlComment, XmlContent, XmlDocument, XmlElement, XmlText};

/// XML parser that builds [`XmlDocument`]s.
#[derive(Debug, Default)]
pub struct XmlParser;

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser
    }

    /// Parses XML from a string. Blank input yields an empty document.
    pub fn parse_str(&self, xml: &str) -> Result<XmlDocument> {
        let mut doc = XmlDocument::new();
        if xml.trim().is_empty() {
            return Ok(doc);
        }

        let mut reader = Reader::from_str(xml);
        // Don't trim text - we handle whitespace normalization ourselves
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        let mut node_stack: Vec<NodeId> = vec![doc.root()];
        let mut current_text: Option<String> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    Self::flush_text(&mut doc, &node_stack, &mut current_text);
                    let element = Self::parse_element(e, &reader)?;
                    let parent = Self::top(&node_stack)?;
                    let node = doc.add_child(parent, XmlContent::Element(element));
                    node_stack.push(node);
                }
                Ok(Event::End(_)) => {
                    Self::flush_text(&mut doc, &node_stack, &mut current_text);
                    if node_stack.len() <= 1 {
                        return Err(Error::Parse("unexpected closing tag".to_string()));
                    }
                    node_stack.pop();
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tag - handle like Start + End
                    Self::flush_text(&mut doc, &node_stack, &mut current_text);
                    let element = Self::parse_element(e, &reader)?;
                    let parent = Self::top(&node_stack)?;
                    doc.add_child(parent, XmlContent::Element(element));
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    Self::push_text(&mut current_text, &text);
                }
                Ok(Event::CData(ref e)) => {
                    // Treat CDATA like text
                    let text = String::from_utf8_lossy(e.as_ref());
                    Self::push_text(&mut current_text, &text);
                }
                Ok(Event::GeneralRef(ref e)) => {
                    let resolved = match e
                        .resolve_char_ref()
                        .map_err(|e| Error::Parse(e.to_string()))?
                    {
                        Some(c) => c.to_string(),
                        None => {
                            let name = e.decode().map_err(|e| Error::Parse(e.to_string()))?;
                            resolve_predefined_entity(&name)
                                .ok_or_else(|| Error::Parse(format!("unknown entity &{name};")))?
                                .to_string()
                        }
                    };
                    current_text.get_or_insert_with(String::new).push_str(&resolved);
                }
                Ok(Event::Comment(ref e)) => {
                    Self::flush_text(&mut doc, &node_stack, &mut current_text);
                    let comment_text = String::from_utf8_lossy(e.as_ref()).to_string();
                    let parent = Self::top(&node_stack)?;
                    doc.add_child(parent, XmlContent::Comment(XmlComment::new(comment_text)));
                }
                Ok(Event::Decl(_)) | Ok(Event::PI(_)) | Ok(Event::DocType(_)) => {
                    // Ignore XML declaration, processing instructions and DOCTYPE
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
            }
        }

        if node_stack.len() > 1 {
            return Err(Error::Parse("unclosed element at end of input".to_string()));
        }
        Self::flush_text(&mut doc, &node_stack, &mut current_text);
        Ok(doc)
    }

    fn top(node_stack: &[NodeId]) -> Result<NodeId> {
        node_stack
            .last()
            .copied()
            .ok_or_else(|| Error::Parse("element stack underflow".to_string()))
    }

    /// Adds accumulated text as a child of the innermost open element.
    fn flush_text(doc: &mut XmlDocument, node_stack: &[NodeId], current_text: &mut Option<String>) {
        if let Some(text) = current_text.take() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                if let Some(parent) = node_stack.last() {
                    doc.add_child(*parent, XmlContent::Text(XmlText::new(trimmed)));
                }
            }
        }
    }

    fn push_text(current_text: &mut Option<String>, text: &str) {
        if let Some(normalized) = Self::normalize_whitespace(text, current_text.as_deref()) {
            current_text.get_or_insert_with(String::new).push_str(&normalized);
        }
    }

    /// Parses an element's name and attributes.
    fn parse_element(e: &BytesStart, reader: &Reader<&[u8]>) -> Result<XmlElement> {
        let name = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            attributes.push((key, value));
        }

        Ok(XmlElement::new(name, attributes))
    }

    /// Collapses consecutive whitespace to a single space.
    ///
    /// Returns `None` if the text is whitespace only.
    fn normalize_whitespace(text: &str, previous: Option<&str>) -> Option<String> {
        let mut last_was_ws = previous.is_none_or(|p| p.ends_with(' '));
        let mut has_non_ws = false;
        let mut result = String::new();

        for c in text.chars() {
            if c.is_whitespace() {
                if !last_was_ws {
                    result.push(' ');
                    last_was_ws = true;
                }
            } else {
                result.push(c);
                last_was_ws = false;
                has_non_ws = true;
            }
        }

        if has_non_ws {
            Some(result)
        } else {
            None
        }
    }
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<XmlDocument> {
    XmlParser::new().parse_str(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let doc = parse_str(r#"<root><child>text</child></root>"#).unwrap();
        let top = doc.children(doc.root());
        assert_eq!(top.len(), 1);
        assert_eq!(doc.name(top[0]), Some("root"));
        let child = doc.children(top[0])[0];
        assert_eq!(doc.name(child), Some("child"));
        assert_eq!(doc.text_content(child), "text");
    }

    #[test]
    fn test_parse_with_attributes_in_order() {
        let doc = parse_str(r#"<root id="foo" class="bar">content</root>"#).unwrap();
        let root = doc.children(doc.root())[0];
        let e = doc.element(root).unwrap();
        assert_eq!(
            e.attributes(),
            &[
                ("id".to_string(), "foo".to_string()),
                ("class".to_string(), "bar".to_string())
            ]
        );
    }

    #[test]
    fn test_whitespace_normalization() {
        let doc = parse_str("<root>\n  <a>  hello   world  </a>\n</root>").unwrap();
        let root = doc.children(doc.root())[0];
        assert_eq!(doc.children(root).len(), 1);
        assert_eq!(doc.text_content(root), "hello world");
    }

    #[test]
    fn test_entities_and_comments() {
        let doc = parse_str("<r><!-- note --><t>a &amp; b</t></r>").unwrap();
        let r = doc.children(doc.root())[0];
        assert!(doc.is_comment(doc.children(r)[0]));
        assert_eq!(doc.text_content(r), "a & b");
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_input() {
        assert!(parse_str("<a><b></a>").is_err());
        assert!(parse_str("<a>").is_err());
    }
}
