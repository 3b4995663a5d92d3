//! XML content types for tree nodes.
//!
//! This module provides `XmlContent`, which represents the content of an XML node:
//! an element (tag with attributes), text, or a comment.

use std::fmt;

/// Represents the content of an XML node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlContent {
    /// An XML element with a qualified name and attributes.
    Element(XmlElement),
    /// XML text content.
    Text(XmlText),
    /// XML comment.
    Comment(XmlComment),
}

/// Node kinds, compared by the key-rule selector when checking that two
/// child sequences line up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlNodeType {
    Element,
    Text,
    Comment,
}

impl XmlContent {
    /// Returns the node kind.
    pub fn node_type(&self) -> XmlNodeType {
        match self {
            XmlContent::Element(_) => XmlNodeType::Element,
            XmlContent::Text(_) => XmlNodeType::Text,
            XmlContent::Comment(_) => XmlNodeType::Comment,
        }
    }

    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, XmlContent::Element(_))
    }

    /// Returns true if this is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, XmlContent::Text(_))
    }

    /// Returns true if this is a comment node.
    pub fn is_comment(&self) -> bool {
        matches!(self, XmlContent::Comment(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a reference to the text, if this is a text node.
    pub fn as_text(&self) -> Option<&XmlText> {
        match self {
            XmlContent::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// An XML element with a qualified name and attributes in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
}

impl XmlElement {
    /// Creates a new XML element with the given name and attributes.
    pub fn new(name: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        XmlElement {
            name: name.into(),
            attributes,
        }
    }

    /// Returns the qualified name of the element.
    pub fn qname(&self) -> &str {
        &self.name
    }

    /// Returns the attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Adds an attribute unless one with the same name exists.
    /// Returns true if it was added.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.attribute(&name).is_some() {
            return false;
        }
        self.attributes.push((name, value.into()));
        true
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, " {}={}", name, value)?;
        }
        write!(f, "}}")
    }
}

/// XML text content, trimmed at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlText {
    text: String,
}

impl XmlText {
    /// Creates a new text node from a string.
    pub fn new(text: impl Into<String>) -> Self {
        XmlText { text: text.into() }
    }

    /// Returns the text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for XmlText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// XML comment content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlComment {
    /// The comment text (without the <!-- and --> markers).
    text: String,
}

impl XmlComment {
    /// Creates a new comment node from a string.
    pub fn new(text: impl Into<String>) -> Self {
        XmlComment { text: text.into() }
    }

    /// Returns the comment text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for XmlComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<!-- {} -->", self.text.trim())
    }
}
