//! JSON documents as an arena tree.
//!
//! A parsed `serde_json::Value` is flattened into nodes addressed by
//! [`JsonNodeId`], so placeholders can be spliced into arrays and objects
//! by position without rebuilding the value.

use serde_json::Value;

use crate::error::Result;
use crate::path::{JsonPath, JsonSegment};

/// Index of a node inside its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsonNodeId(usize);

/// What a node holds.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonKind {
    Object,
    Array,
    /// A string, number, boolean or null.
    Scalar(Value),
    /// An empty row standing in for content that only the other side has.
    Placeholder,
}

/// One node in the arena.
#[derive(Debug, Clone)]
pub struct JsonNode {
    /// Member name when the parent is an object.
    pub key: Option<String>,
    pub kind: JsonKind,
    pub parent: Option<JsonNodeId>,
    pub children: Vec<JsonNodeId>,
}

/// A parsed JSON document. Blank input has no root.
#[derive(Debug, Clone, Default)]
pub struct JsonDocument {
    nodes: Vec<JsonNode>,
    root: Option<JsonNodeId>,
}

impl JsonDocument {
    /// Parses `raw`. Blank input yields an empty document.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut doc = JsonDocument::default();
        if raw.trim().is_empty() {
            return Ok(doc);
        }
        let value: Value = serde_json::from_str(raw)?;
        doc.root = Some(doc.add_value(None, None, &value));
        Ok(doc)
    }

    fn add_value(
        &mut self,
        parent: Option<JsonNodeId>,
        key: Option<String>,
        value: &Value,
    ) -> JsonNodeId {
        let kind = match value {
            Value::Object(_) => JsonKind::Object,
            Value::Array(_) => JsonKind::Array,
            scalar => JsonKind::Scalar(scalar.clone()),
        };
        let id = self.new_node(key, kind);
        self.nodes[id.0].parent = parent;
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let child = self.add_value(Some(id), Some(k.clone()), v);
                    self.nodes[id.0].children.push(child);
                }
            }
            Value::Array(items) => {
                for v in items {
                    let child = self.add_value(Some(id), None, v);
                    self.nodes[id.0].children.push(child);
                }
            }
            _ => {}
        }
        id
    }

    /// Returns the root, `None` for an empty document.
    pub fn root(&self) -> Option<JsonNodeId> {
        self.root
    }

    /// Returns true if the document has no root.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the node for `id`.
    pub fn node(&self, id: JsonNodeId) -> &JsonNode {
        &self.nodes[id.0]
    }

    /// Returns the children of `id`.
    pub fn children(&self, id: JsonNodeId) -> &[JsonNodeId] {
        &self.nodes[id.0].children
    }

    /// Returns the position of `id` among its siblings.
    pub fn position(&self, id: JsonNodeId) -> Option<usize> {
        let parent = self.nodes[id.0].parent?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Sorts the members of every object by key.
    pub fn sort_keys(&mut self) {
        for i in 0..self.nodes.len() {
            if self.nodes[i].kind != JsonKind::Object {
                continue;
            }
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|a, b| self.nodes[a.0].key.cmp(&self.nodes[b.0].key));
            self.nodes[i].children = children;
        }
    }

    /// Resolves a path. An integer segment indexes an array, or names a
    /// member of an object.
    pub fn resolve(&self, path: &JsonPath) -> Option<JsonNodeId> {
        let mut current = self.root?;
        for segment in path.segments() {
            let node = self.node(current);
            current = match (&node.kind, segment) {
                (JsonKind::Array, JsonSegment::Index(i)) => *node.children.get(*i)?,
                (JsonKind::Object, seg) => {
                    let key = seg.as_key();
                    *node
                        .children
                        .iter()
                        .find(|c| self.node(**c).key.as_deref() == Some(key.as_str()))?
                }
                _ => return None,
            };
        }
        Some(current)
    }

    /// Creates a detached node.
    pub fn new_node(&mut self, key: Option<String>, kind: JsonKind) -> JsonNodeId {
        let id = JsonNodeId(self.nodes.len());
        self.nodes.push(JsonNode {
            key,
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Inserts a detached node at `index` among the children of `parent`.
    /// Indexes past the end append.
    pub fn insert_child(&mut self, parent: JsonNodeId, index: usize, child: JsonNodeId) {
        self.nodes[child.0].parent = Some(parent);
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Deep-copies the subtree at `id` of `other` into this arena. The copy
    /// keeps its member name only if `keep_key` is set.
    pub fn import(&mut self, other: &JsonDocument, id: JsonNodeId, keep_key: bool) -> JsonNodeId {
        let source = other.node(id);
        let key = if keep_key { source.key.clone() } else { None };
        let copy = self.new_node(key, source.kind.clone());
        for child in &source.children {
            let keep = source.kind == JsonKind::Object;
            let child_copy = self.import(other, *child, keep);
            self.nodes[child_copy.0].parent = Some(copy);
            self.nodes[copy.0].children.push(child_copy);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(p: &str) -> JsonPath {
        JsonPath::parse(p).unwrap()
    }

    #[test]
    fn test_parse_and_resolve() {
        let doc = JsonDocument::parse(r#"{"a":{"list":[1,{"b":true}]},"7":"seven"}"#).unwrap();
        let b = doc.resolve(&path("/a/list/1/b")).unwrap();
        assert_eq!(doc.node(b).kind, JsonKind::Scalar(Value::Bool(true)));
        let seven = doc.resolve(&path("/7")).unwrap();
        assert_eq!(doc.node(seven).key.as_deref(), Some("7"));
        assert!(doc.resolve(&path("/a/list/2")).is_none());
        assert!(doc.resolve(&path("/a/x")).is_none());
        assert_eq!(doc.resolve(&path("/")), doc.root());
    }

    #[test]
    fn test_member_order_is_preserved() {
        let doc = JsonDocument::parse(r#"{"z":1,"a":2}"#).unwrap();
        let root = doc.root().unwrap();
        let keys: Vec<_> = doc
            .children(root)
            .iter()
            .map(|c| doc.node(*c).key.clone().unwrap())
            .collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_sort_keys() {
        let mut doc = JsonDocument::parse(r#"{"z":1,"a":{"y":1,"b":2}}"#).unwrap();
        doc.sort_keys();
        let a = doc.resolve(&path("/a")).unwrap();
        assert_eq!(doc.position(a), Some(0));
        let b = doc.resolve(&path("/a/b")).unwrap();
        assert_eq!(doc.position(b), Some(0));
    }

    #[test]
    fn test_import_and_insert() {
        let source = JsonDocument::parse(r#"[{"k":[1,2]}]"#).unwrap();
        let mut doc = JsonDocument::parse("[0]").unwrap();
        let item = source.resolve(&path("/0")).unwrap();
        let copy = doc.import(&source, item, false);
        let root = doc.root().unwrap();
        doc.insert_child(root, 0, copy);
        let inner = doc.resolve(&path("/0/k/1")).unwrap();
        assert_eq!(doc.node(inner).kind, JsonKind::Scalar(Value::from(2)));
        assert_eq!(doc.children(root).len(), 2);
    }

    #[test]
    fn test_empty_and_malformed() {
        assert!(JsonDocument::parse("  ").unwrap().is_empty());
        assert!(JsonDocument::parse("{\"a\":").is_err());
    }
}
