//! Row-oriented output tree for XML and text renderings.
//!
//! Nodes live in an arena owned by [`HighlighterTree`]; `parent` and
//! `children` are indexes into it. Index 0 is an invisible root row.

use serde::Serialize;

use crate::message::ResultType;

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlighterNode {
    /// HTML fragment for this row.
    pub value: String,
    /// Status of the row; `IDENTICAL` when unmarked.
    pub validation_status: ResultType,
    /// 1-based display line; 0 for the root.
    pub row_number: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// The row closing (or opening) the same bracketed block.
    pub linked_row: Option<usize>,
    /// Location of the rendered node in its source document.
    pub original_path: Option<String>,
}

/// A rendered side as a tree of rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlighterTree {
    nodes: Vec<HighlighterNode>,
}

impl Default for HighlighterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HighlighterTree {
    /// Creates a tree holding only the root.
    pub fn new() -> Self {
        HighlighterTree {
            nodes: vec![HighlighterNode {
                value: String::new(),
                validation_status: ResultType::Identical,
                row_number: 0,
                parent: None,
                children: Vec::new(),
                linked_row: None,
                original_path: None,
            }],
        }
    }

    /// Index of the root.
    pub fn root(&self) -> usize {
        0
    }

    /// Returns the node at `index`.
    pub fn node(&self, index: usize) -> &HighlighterNode {
        &self.nodes[index]
    }

    /// Appends a row under `parent`. Rows are numbered in creation order,
    /// which is display order.
    pub fn add_row(
        &mut self,
        parent: usize,
        value: String,
        status: ResultType,
        original_path: Option<String>,
    ) -> usize {
        let index = self.nodes.len();
        self.nodes.push(HighlighterNode {
            value,
            validation_status: status,
            row_number: index,
            parent: Some(parent),
            children: Vec::new(),
            linked_row: None,
            original_path,
        });
        self.nodes[parent].children.push(index);
        index
    }

    /// Links two rows to each other.
    pub fn link(&mut self, a: usize, b: usize) {
        self.nodes[a].linked_row = Some(b);
        self.nodes[b].linked_row = Some(a);
    }

    /// Number of visible rows.
    pub fn row_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Visible rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = &HighlighterNode> {
        self.nodes.iter().skip(1)
    }

    /// Returns the row with the given 1-based number.
    pub fn row(&self, row_number: usize) -> Option<&HighlighterNode> {
        if row_number == 0 {
            return None;
        }
        self.nodes.get(row_number)
    }

    /// Row values joined by newlines.
    pub fn to_html(&self) -> String {
        self.rows()
            .map(|r| r.value.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_links() {
        let mut tree = HighlighterTree::new();
        let open = tree.add_row(0, "<a>".into(), ResultType::Identical, None);
        let inner = tree.add_row(open, "x".into(), ResultType::Modified, None);
        let close = tree.add_row(0, "</a>".into(), ResultType::Identical, None);
        tree.link(open, close);

        assert_eq!(tree.row_count(), 3);
        assert_eq!(tree.row(1).unwrap().value, "<a>");
        assert_eq!(tree.node(inner).parent, Some(open));
        assert_eq!(tree.node(inner).row_number, 2);
        assert_eq!(tree.node(open).linked_row, Some(close));
        assert_eq!(tree.node(close).linked_row, Some(open));
        assert_eq!(tree.node(0).children, vec![open, close]);
        assert_eq!(tree.to_html(), "<a>\nx\n</a>");
        assert!(tree.row(0).is_none());
    }
}
