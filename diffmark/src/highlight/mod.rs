//! Diff-to-highlight reconstruction.
//!
//! Every format follows the same skeleton. Both raw documents are parsed,
//! the diff list is filtered and normalized per side, sorted with the
//! segment-wise comparator, attached to its targets as [`markup::Marker`]s,
//! and one-sided content is spliced into the other side as placeholders.
//! Placeholders are collected first and applied per parent in reverse
//! position order in a dedicated pass, so positions computed from the
//! origin document stay valid.

pub mod json;
pub mod markup;
pub mod table;
pub mod text;
pub mod tree;
pub mod xml;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::message::{messages_for_side, DiffMessage, Side, SideMessage};
use crate::path::{sort_key, sort_messages, PathStyle};
use crate::rules::HighlightRules;

pub use json::JsonReconstructor;
pub use table::TableReconstructor;
pub use text::{TextMode, TextReconstructor};
pub use tree::{HighlighterNode, HighlighterTree};
pub use xml::XmlReconstructor;

/// One rendered side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderedSide {
    /// Row tree, for XML and text.
    Tree(HighlighterTree),
    /// Ready-to-embed HTML, for JSON and tables.
    Html(String),
}

impl RenderedSide {
    /// Returns the tree, if this side is one.
    pub fn as_tree(&self) -> Option<&HighlighterTree> {
        match self {
            RenderedSide::Tree(t) => Some(t),
            RenderedSide::Html(_) => None,
        }
    }

    /// Returns the HTML, if this side is a string.
    pub fn as_html(&self) -> Option<&str> {
        match self {
            RenderedSide::Html(h) => Some(h),
            RenderedSide::Tree(_) => None,
        }
    }

    /// Renders either shape as an HTML string.
    pub fn to_html(&self) -> String {
        match self {
            RenderedSide::Tree(t) => t.to_html(),
            RenderedSide::Html(h) => h.clone(),
        }
    }
}

/// Both rendered sides of one comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlighted {
    pub er: RenderedSide,
    pub ar: RenderedSide,
    /// Expected and actual in one view; tables only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combined: Option<String>,
}

/// Renders a diff list against the expected and actual documents.
pub trait Reconstructor {
    /// Parses both documents and renders each side with its markers.
    fn highlight(
        &self,
        diffs: &[DiffMessage],
        expected: &str,
        actual: &str,
        rules: &HighlightRules,
    ) -> Result<Highlighted>;
}

/// Supported artifact formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Xml,
    Json,
    Table,
    Text,
    FullText,
}

impl Format {
    fn as_str(&self) -> &'static str {
        match self {
            Format::Xml => "xml",
            Format::Json => "json",
            Format::Table => "table",
            Format::Text => "text",
            Format::FullText => "full-text",
        }
    }

    /// Returns the reconstructor for this format.
    pub fn reconstructor(&self) -> Box<dyn Reconstructor> {
        match self {
            Format::Xml => Box::new(XmlReconstructor),
            Format::Json => Box::new(JsonReconstructor),
            Format::Table => Box::new(TableReconstructor),
            Format::Text => Box::new(TextReconstructor::new(TextMode::Plain)),
            Format::FullText => Box::new(TextReconstructor::new(TextMode::Full)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        [
            Format::Xml,
            Format::Json,
            Format::Table,
            Format::Text,
            Format::FullText,
        ]
        .into_iter()
        .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| Error::Config(format!("unknown format: {s:?}")))
    }
}

/// Validates `rules` and renders `diffs` in the given format.
///
/// Configuration errors are reported before anything is parsed.
pub fn highlight(
    format: Format,
    diffs: &[DiffMessage],
    expected: &str,
    actual: &str,
    rules: &HashMap<String, Vec<String>>,
) -> Result<Highlighted> {
    let rules = HighlightRules::from_map(rules)?;
    format
        .reconstructor()
        .highlight(diffs, expected, actual, &rules)
}

/// Messages for `side` that get rendered, sorted by path.
///
/// Drops skipped and not-applicable entries, results that never produce a
/// marker, and anything under an excluded path.
pub(crate) fn side_messages(
    diffs: &[DiffMessage],
    side: Side,
    rules: &HighlightRules,
    style: PathStyle,
) -> Vec<SideMessage> {
    let mut messages: Vec<SideMessage> = messages_for_side(diffs, side)
        .into_iter()
        .filter(|m| m.result.is_difference())
        .filter(|m| {
            let excluded = rules.is_excluded(sort_key(m), style)
                || (m.insertion_parent().is_some() && rules.is_excluded(&m.other_path, style));
            if excluded {
                debug!("diff {} is under an excluded path", m.order_id);
            }
            !excluded
        })
        .collect();
    sort_messages(&mut messages, style);
    messages
}

/// Orders pending insertions for one parent.
///
/// `pending` holds each insertion's position in the origin document.
/// Returns `(index, item)` pairs where `index` addresses the parent's
/// original `len` children, in the order they must be applied: descending,
/// so every insertion leaves the indexes of the following ones intact.
/// After all are applied, each placeholder sits at its origin position.
/// Insertions sharing an origin position end up adjacent, in input order.
pub(crate) fn insertion_plan<T>(mut pending: Vec<(usize, T)>, len: usize) -> Vec<(usize, T)> {
    pending.sort_by_key(|(origin, _)| *origin);
    let mut next_free = 0;
    let mut plan: Vec<(usize, T)> = pending
        .into_iter()
        .enumerate()
        .map(|(rank, (origin, item))| {
            let position = origin.max(next_free);
            next_free = position.saturating_add(1);
            ((position - rank).min(len), item)
        })
        .collect();
    plan.reverse();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ResultType;

    fn apply(original: &[&str], pending: Vec<(usize, &'static str)>) -> Vec<String> {
        let mut out: Vec<String> = original.iter().map(|s| s.to_string()).collect();
        for (index, item) in insertion_plan(pending, original.len()) {
            out.insert(index, item.to_string());
        }
        out
    }

    #[test]
    fn test_insertions_land_at_origin_positions() {
        assert_eq!(
            apply(&["a0", "a1", "a2"], vec![(2, "P2"), (0, "P0")]),
            vec!["P0", "a0", "P2", "a1", "a2"]
        );
    }

    #[test]
    fn test_adjacent_and_trailing_insertions() {
        assert_eq!(
            apply(&["a0"], vec![(1, "P1"), (2, "P2"), (3, "P3")]),
            vec!["a0", "P1", "P2", "P3"]
        );
        assert_eq!(
            apply(&["a0", "a1"], vec![(0, "P0"), (1, "P1")]),
            vec!["P0", "P1", "a0", "a1"]
        );
        assert_eq!(apply(&[], vec![(5, "P")]), vec!["P"]);
    }

    #[test]
    fn test_shared_origin_positions_stay_in_order() {
        assert_eq!(
            apply(&["a0", "a1"], vec![(1, "P"), (1, "Q")]),
            vec!["a0", "P", "Q", "a1"]
        );
        assert_eq!(
            apply(&["a0"], vec![(usize::MAX, "P"), (usize::MAX, "Q")]),
            vec!["a0", "P", "Q"]
        );
    }

    #[test]
    fn test_format_names() {
        assert_eq!("full-text".parse::<Format>().unwrap(), Format::FullText);
        assert_eq!(Format::Table.to_string(), "table");
        assert!(matches!("csv".parse::<Format>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_side_messages_filter_and_sort() {
        let diffs = vec![
            DiffMessage::new(1, "/a/10", "/a/10", ResultType::Modified),
            DiffMessage::new(2, "/a/9", "/a/9", ResultType::Modified),
            DiffMessage::new(3, "/a/1", "/a/1", ResultType::Identical),
            DiffMessage::new(4, "/b", "", ResultType::Missed),
            DiffMessage::new(5, "/x/y", "/x/y", ResultType::Error),
        ];
        let mut map = HashMap::new();
        map.insert("exclude-path".to_string(), vec!["/x".to_string()]);
        let rules = HighlightRules::from_map(&map).unwrap();

        let er: Vec<u64> = side_messages(&diffs, Side::Expected, &rules, PathStyle::Json)
            .iter()
            .map(|m| m.order_id)
            .collect();
        assert_eq!(er, vec![2, 1, 4]);
        let ar = side_messages(&diffs, Side::Actual, &rules, PathStyle::Json);
        assert_eq!(ar.len(), 2);
    }
}
