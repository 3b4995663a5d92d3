//! Node structures for XML tree representation.
//!
//! Documents are stored as an arena: every node lives in one `Vec` owned by
//! the [`XmlDocument`] and is addressed by a [`NodeId`]. Each node stores its
//! parent id and an ordered list of child ids, so insertion by position is a
//! splice of that list and no reference cycles exist.

mod xml_content;

pub use xml_content::{XmlComment, XmlContent, XmlElement, XmlNodeType, XmlText};

use crate::constants::XML_ROOT_TAG;
use crate::path::{XPath, XPathStep};

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One node in the arena.
#[derive(Debug, Clone)]
pub struct XmlNode {
    content: XmlContent,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl XmlNode {
    /// Returns the content of this node.
    pub fn content(&self) -> &XmlContent {
        &self.content
    }

    /// Returns the parent, `None` for the root or a detached node.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in document order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// What an XPath resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlTarget {
    /// An element, text or comment node.
    Node(NodeId),
    /// An attribute of an element.
    Attribute(NodeId, String),
}

/// An XML document rooted at a synthetic `$ROOT$` element.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlDocument {
    /// Creates an empty document holding only the synthetic root.
    pub fn new() -> Self {
        XmlDocument {
            nodes: vec![XmlNode {
                content: XmlContent::Element(XmlElement::new(XML_ROOT_TAG, Vec::new())),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Returns the synthetic root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns true if the document has no content below the root.
    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    /// Returns the number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node for `id`.
    pub fn node(&self, id: NodeId) -> &XmlNode {
        &self.nodes[id.0]
    }

    /// Returns the content of `id`.
    pub fn content(&self, id: NodeId) -> &XmlContent {
        &self.nodes[id.0].content
    }

    /// Returns the children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the element at `id`, if it is one.
    pub fn element(&self, id: NodeId) -> Option<&XmlElement> {
        self.content(id).as_element()
    }

    /// Returns a mutable element at `id`, if it is one.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut XmlElement> {
        self.nodes[id.0].content.as_element_mut()
    }

    /// Returns the element name at `id`.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(XmlElement::qname)
    }

    /// Returns true if `id` is a comment.
    pub fn is_comment(&self, id: NodeId) -> bool {
        self.content(id).is_comment()
    }

    /// Returns the children of `id` that are not comments.
    pub fn significant_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| !self.is_comment(*c))
            .collect()
    }

    /// Returns the element children of `id`.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.content(*c).is_element())
    }

    /// Returns element children of `id` with the given name.
    pub fn named_children<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.element_children(id)
            .filter(move |c| self.name(*c) == Some(name))
    }

    /// Concatenated, trimmed text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.content(id) {
            XmlContent::Text(t) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(t.text());
            }
            XmlContent::Element(_) => {
                for child in self.children(id) {
                    self.collect_text(*child, out);
                }
            }
            XmlContent::Comment(_) => {}
        }
    }

    /// Returns `id` and all its descendants in document order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Zero-based position among siblings, comments ignored.
    pub fn significant_position(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.significant_children(parent)
            .iter()
            .position(|c| *c == id)
    }

    /// Creates a detached node.
    pub fn new_node(&mut self, content: XmlContent) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(XmlNode {
            content,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Creates a node and appends it to `parent`.
    pub fn add_child(&mut self, parent: NodeId, content: XmlContent) -> NodeId {
        let id = self.new_node(content);
        self.append_child(parent, id);
        id
    }

    /// Appends a detached node to `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts a detached node at `index` among the children of `parent`.
    /// Indexes past the end append.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Replaces the child list of `parent` with a permutation of itself.
    pub(crate) fn reorder_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        debug_assert_eq!(children.len(), self.nodes[parent.0].children.len());
        self.nodes[parent.0].children = children;
    }

    /// Deep-copies the subtree at `id` of `other` into this arena,
    /// returning the detached copy.
    pub fn import(&mut self, other: &XmlDocument, id: NodeId) -> NodeId {
        let copy = self.new_node(other.content(id).clone());
        for child in other.children(id) {
            let child_copy = self.import(other, *child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Resolves an XPath against this document.
    pub fn resolve(&self, path: &XPath) -> Option<XmlTarget> {
        let mut current = self.root();
        for step in path.steps() {
            match step {
                XPathStep::Element { name, index } => {
                    current = self.named_children(current, name).nth(index - 1)?;
                }
                XPathStep::Text { index } => {
                    current = self
                        .children(current)
                        .iter()
                        .copied()
                        .filter(|c| self.content(*c).is_text())
                        .nth(index - 1)?;
                }
                XPathStep::Comment { index } => {
                    current = self
                        .children(current)
                        .iter()
                        .copied()
                        .filter(|c| self.is_comment(*c))
                        .nth(index - 1)?;
                }
                XPathStep::Attribute(name) => {
                    self.element(current)?.attribute(name)?;
                    return Some(XmlTarget::Attribute(current, name.clone()));
                }
            }
        }
        Some(XmlTarget::Node(current))
    }

    /// Builds the indexed XPath of `id`.
    pub fn xpath_of(&self, id: NodeId) -> XPath {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let siblings = self.children(parent);
            let before = &siblings[..siblings.iter().position(|c| *c == current).unwrap_or(0)];
            let step = match self.content(current) {
                XmlContent::Element(e) => XPathStep::Element {
                    name: e.qname().to_string(),
                    index: 1 + before
                        .iter()
                        .filter(|c| self.name(**c) == Some(e.qname()))
                        .count(),
                },
                XmlContent::Text(_) => XPathStep::Text {
                    index: 1 + before
                        .iter()
                        .filter(|c| self.content(**c).is_text())
                        .count(),
                },
                XmlContent::Comment(_) => XPathStep::Comment {
                    index: 1 + before.iter().filter(|c| self.is_comment(**c)).count(),
                },
            };
            steps.push(step);
            current = parent;
        }
        let mut path = XPath::default();
        for step in steps.into_iter().rev() {
            path.push(step);
        }
        path
    }
}
