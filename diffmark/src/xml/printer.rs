//! Prints an annotated XML document as a [`HighlighterTree`].
//!
//! Every element with mixed or element content takes two rows: the opening
//! tag, with its content nested below it, and the closing tag, linked to the
//! opening row. Empty elements and elements holding a single text node take
//! one row. Tags are rendered as escaped text, so rows can be embedded in
//! HTML as is.

use rustc_hash::FxHashMap;

use crate::constants::INDENT;
use crate::highlight::markup::{escape, wrap_opt, Marker};
use crate::highlight::tree::HighlighterTree;
use crate::message::ResultType;
use crate::node::{NodeId, XmlContent, XmlDocument, XmlElement};

/// Markers attached to the nodes and attributes of one document.
#[derive(Debug, Clone, Default)]
pub struct XmlMarkers {
    nodes: FxHashMap<NodeId, Marker>,
    attributes: FxHashMap<(NodeId, String), Marker>,
}

impl XmlMarkers {
    /// Creates an empty marker set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a node. The first marker on a node wins; returns false if
    /// the node was already marked.
    pub fn mark_node(&mut self, id: NodeId, marker: Marker) -> bool {
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, marker);
        true
    }

    /// Marks an attribute. The first marker wins.
    pub fn mark_attribute(&mut self, id: NodeId, name: &str, marker: Marker) -> bool {
        let key = (id, name.to_string());
        if self.attributes.contains_key(&key) {
            return false;
        }
        self.attributes.insert(key, marker);
        true
    }

    /// Returns the marker of a node.
    pub fn node(&self, id: NodeId) -> Option<&Marker> {
        self.nodes.get(&id)
    }

    /// Returns the marker of an attribute.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&Marker> {
        self.attributes.get(&(id, name.to_string()))
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.nodes.len() + self.attributes.len()
    }

    /// Returns true if nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Builds highlighter rows from an annotated document.
pub struct HighlightPrinter<'a> {
    doc: &'a XmlDocument,
    markers: &'a XmlMarkers,
    tree: HighlighterTree,
}

impl<'a> HighlightPrinter<'a> {
    /// Creates a printer for `doc`.
    pub fn new(doc: &'a XmlDocument, markers: &'a XmlMarkers) -> Self {
        HighlightPrinter {
            doc,
            markers,
            tree: HighlighterTree::new(),
        }
    }

    /// Prints the whole document.
    pub fn print(mut self) -> HighlighterTree {
        let root_row = self.tree.root();
        for child in self.doc.children(self.doc.root()) {
            self.print_node(*child, root_row, 0, None);
        }
        self.tree
    }

    fn print_node(
        &mut self,
        id: NodeId,
        parent_row: usize,
        depth: usize,
        inherited: Option<Marker>,
    ) {
        let doc = self.doc;
        let marker = self.markers.node(id).cloned().or(inherited);
        let indent = INDENT.repeat(depth);
        let path = Some(doc.xpath_of(id).to_string());

        match doc.content(id) {
            XmlContent::Text(text) => {
                let value = format!(
                    "{indent}{}",
                    wrap_opt(marker.as_ref(), &escape(text.text()))
                );
                self.tree.add_row(parent_row, value, status(marker.as_ref()), path);
            }
            XmlContent::Comment(comment) => {
                let value = format!(
                    "{indent}{}",
                    wrap_opt(marker.as_ref(), &escape(&comment.to_string()))
                );
                self.tree.add_row(parent_row, value, status(marker.as_ref()), path);
            }
            XmlContent::Element(element) => {
                self.print_element(id, element, parent_row, &indent, depth, marker, path)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn print_element(
        &mut self,
        id: NodeId,
        element: &'a XmlElement,
        parent_row: usize,
        indent: &str,
        depth: usize,
        marker: Option<Marker>,
        path: Option<String>,
    ) {
        let name = escape(element.qname());
        let attributes = self.attributes(id, element);
        let inner = marker.as_ref().and_then(Marker::inheritance);
        let row_status = marker
            .as_ref()
            .map(Marker::status)
            .or_else(|| self.first_attribute_status(id, element))
            .unwrap_or(ResultType::Identical);
        let doc = self.doc;
        let children = doc.children(id);

        if children.is_empty() {
            let tag = format!("&lt;{name}{attributes}/&gt;");
            let value = format!("{indent}{}", wrap_opt(marker.as_ref(), &tag));
            self.tree.add_row(parent_row, value, row_status, path);
            return;
        }

        if let [only] = children {
            if let Some(text) = doc.content(*only).as_text() {
                let text_marker = self.markers.node(*only).cloned().or(inner);
                let tag = format!(
                    "&lt;{name}{attributes}&gt;{}&lt;/{name}&gt;",
                    wrap_opt(text_marker.as_ref(), &escape(text.text()))
                );
                let value = format!("{indent}{}", wrap_opt(marker.as_ref(), &tag));
                let row_status = if row_status == ResultType::Identical {
                    status(text_marker.as_ref())
                } else {
                    row_status
                };
                self.tree.add_row(parent_row, value, row_status, path);
                return;
            }
        }

        let open = format!("&lt;{name}{attributes}&gt;");
        let open_row = self.tree.add_row(
            parent_row,
            format!("{indent}{}", wrap_opt(marker.as_ref(), &open)),
            row_status,
            path.clone(),
        );
        for child in children {
            self.print_node(*child, open_row, depth + 1, inner.clone());
        }

        // The closing row repeats the class but not the anchor.
        let close_marker = marker.as_ref().map(|m| Marker::inherited(m.result));
        let close = format!("&lt;/{name}&gt;");
        let close_row = self.tree.add_row(
            parent_row,
            format!("{indent}{}", wrap_opt(close_marker.as_ref(), &close)),
            status(close_marker.as_ref()),
            path,
        );
        self.tree.link(open_row, close_row);
    }

    fn attributes(&self, id: NodeId, element: &XmlElement) -> String {
        element
            .attributes()
            .iter()
            .map(|(k, v)| {
                let fragment = format!("{}=\"{}\"", escape(k), escape(v));
                format!(" {}", wrap_opt(self.markers.attribute(id, k), &fragment))
            })
            .collect()
    }

    fn first_attribute_status(&self, id: NodeId, element: &XmlElement) -> Option<ResultType> {
        element
            .attributes()
            .iter()
            .find_map(|(k, _)| self.markers.attribute(id, k))
            .map(Marker::status)
    }
}

fn status(marker: Option<&Marker>) -> ResultType {
    marker.map(Marker::status).unwrap_or(ResultType::Identical)
}

/// Prints `doc` with `markers` into a new tree.
pub fn print_highlighted(doc: &XmlDocument, markers: &XmlMarkers) -> HighlighterTree {
    HighlightPrinter::new(doc, markers).print()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::markup::Anchor;
    use crate::xml::parse_str;

    fn marker(result: ResultType, order_id: u64) -> Marker {
        Marker {
            result,
            anchor: Some(Anchor {
                order_id,
                description: String::new(),
            }),
        }
    }

    fn values(tree: &HighlighterTree) -> Vec<String> {
        tree.rows().map(|r| r.value.clone()).collect()
    }

    #[test]
    fn test_unmarked_document() {
        let doc = parse_str(r#"<r a="1"><x>t</x><y/><!-- c --></r>"#).unwrap();
        let tree = print_highlighted(&doc, &XmlMarkers::new());
        assert_eq!(
            values(&tree),
            vec![
                "&lt;r a=\"1\"&gt;",
                "  &lt;x&gt;t&lt;/x&gt;",
                "  &lt;y/&gt;",
                "  &lt;!-- c --&gt;",
                "&lt;/r&gt;",
            ]
        );
        let open = tree.row(1).unwrap();
        assert_eq!(open.linked_row, Some(5));
        assert_eq!(open.children.len(), 3);
        assert_eq!(tree.row(2).unwrap().original_path.as_deref(), Some("/r[1]/x[1]"));
        assert!(tree.rows().all(|r| r.validation_status == ResultType::Identical));
    }

    #[test]
    fn test_text_and_attribute_markers() {
        let doc = parse_str(r#"<r><x id="1">t</x></r>"#).unwrap();
        let r = doc.children(doc.root())[0];
        let x = doc.children(r)[0];
        let text = doc.children(x)[0];
        let mut markers = XmlMarkers::new();
        assert!(markers.mark_node(text, marker(ResultType::Modified, 1)));
        assert!(!markers.mark_node(text, marker(ResultType::Error, 2)));
        markers.mark_attribute(x, "id", marker(ResultType::Similar, 3));

        let tree = print_highlighted(&doc, &markers);
        let row = tree.row(2).unwrap();
        assert_eq!(
            row.value,
            "  &lt;x <span class=\"SIMILAR\" data-order-id=\"3\">id=\"1\"</span>&gt;\
             <span class=\"MODIFIED\" data-order-id=\"1\">t</span>&lt;/x&gt;"
        );
        assert_eq!(row.validation_status, ResultType::Similar);
    }

    #[test]
    fn test_one_sided_subtree_inherits_class() {
        let doc = parse_str("<r><x><y>1</y><z/></x></r>").unwrap();
        let r = doc.children(doc.root())[0];
        let x = doc.children(r)[0];
        let mut markers = XmlMarkers::new();
        markers.mark_node(x, marker(ResultType::Missed, 4));

        let tree = print_highlighted(&doc, &markers);
        let rows: Vec<_> = tree.rows().collect();
        assert_eq!(rows[1].validation_status, ResultType::Missed);
        assert!(rows[1].value.contains("data-order-id=\"4\""));
        for inner in &rows[2..5] {
            assert!(inner.value.contains("class=\"MISSED\""), "{}", inner.value);
            assert!(!inner.value.contains("data-order-id"));
            assert_eq!(inner.validation_status, ResultType::Hidden);
        }
        assert_eq!(rows[0].validation_status, ResultType::Identical);
    }

    #[test]
    fn test_modified_element_does_not_mark_children() {
        let doc = parse_str("<r><x><y>1</y><z/></x></r>").unwrap();
        let r = doc.children(doc.root())[0];
        let x = doc.children(r)[0];
        let mut markers = XmlMarkers::new();
        markers.mark_node(x, marker(ResultType::Modified, 5));

        let tree = print_highlighted(&doc, &markers);
        assert_eq!(tree.row(3).unwrap().value, "    &lt;y&gt;1&lt;/y&gt;");
        assert_eq!(tree.row(5).unwrap().value, "  <span class=\"MODIFIED\">&lt;/x&gt;</span>");
    }

    #[test]
    fn test_empty_document() {
        let tree = print_highlighted(&XmlDocument::new(), &XmlMarkers::new());
        assert_eq!(tree.row_count(), 0);
    }
}
