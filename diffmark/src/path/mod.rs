//! Position strings carried by a [`DiffMessage`](crate::DiffMessage).
//!
//! Each format has its own grammar (XPath, JSON path, table coordinate,
//! text range). All of them share the segment-wise ordering in this module:
//! a path is split on its separators, corresponding segments are compared
//! numerically when both are integers and lexicographically otherwise, and a
//! strict prefix sorts first.

pub mod json_path;
pub mod table;
pub mod text;
pub mod xpath;

pub use json_path::{JsonPath, JsonSegment};
pub use table::TableCoordinate;
pub use text::{CharInterval, TextRange};
pub use xpath::{XPath, XPathStep};

use std::cmp::Ordering;

use crate::message::SideMessage;

/// Separator sets for the supported path grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStyle {
    /// XPath. Index predicates become their own segments so `item[10]`
    /// sorts after `item[9]`.
    XPath,
    /// `/seg/seg` JSON paths.
    Json,
    /// `table:row,col:check:report` coordinates.
    Table,
    /// `N1-N2:K1-K2` text ranges.
    Text,
}

impl PathStyle {
    fn separators(&self) -> &'static [char] {
        match self {
            PathStyle::XPath => &['/', '[', ']'],
            PathStyle::Json => &['/'],
            PathStyle::Table => &[':', ','],
            PathStyle::Text => &['-', ':', ','],
        }
    }

    /// Splits `path` into its non-empty segments.
    pub fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
        path.split(self.separators())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Compares two segments: numerically if both parse as integers.
pub fn compare_segments(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

/// Segment-wise path comparison.
pub fn compare_paths(a: &str, b: &str, style: PathStyle) -> Ordering {
    let sa = style.segments(a);
    let sb = style.segments(b);
    for (x, y) in sa.iter().zip(sb.iter()) {
        match compare_segments(x, y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    sa.len().cmp(&sb.len())
}

/// Returns true if `path` equals `ancestor` or lies below it.
pub fn is_under(path: &str, ancestor: &str, style: PathStyle) -> bool {
    let sp = style.segments(path);
    let sa = style.segments(ancestor);
    sa.len() <= sp.len() && sa.iter().zip(sp.iter()).all(|(a, p)| a == p)
}

/// The path a message is ordered by: the insertion parent for `parent:`
/// messages, the own path otherwise.
pub fn sort_key(msg: &SideMessage) -> &str {
    msg.insertion_parent().unwrap_or(&msg.own_path)
}

/// Sorts messages by path, keeping `order_id` order for equal paths.
pub fn sort_messages(messages: &mut [SideMessage], style: PathStyle) {
    messages.sort_by(|a, b| {
        compare_paths(sort_key(a), sort_key(b), style).then(a.order_id.cmp(&b.order_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DiffMessage, ResultType, Side};

    fn side(order_id: u64, path: &str) -> SideMessage {
        DiffMessage::new(order_id, path, path, ResultType::Modified)
            .for_side(Side::Expected)
            .unwrap()
    }

    #[test]
    fn test_numeric_segments() {
        assert_eq!(
            compare_paths("/a/9", "/a/10", PathStyle::Json),
            Ordering::Less
        );
        assert_eq!(
            compare_paths("/a[1]/item[9]", "/a[1]/item[10]", PathStyle::XPath),
            Ordering::Less
        );
        assert_eq!(compare_paths("/a/b", "/a/a", PathStyle::Json), Ordering::Greater);
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(compare_paths("/a", "/a/0", PathStyle::Json), Ordering::Less);
        assert_eq!(compare_paths("/a/0", "/a", PathStyle::Json), Ordering::Greater);
        assert_eq!(compare_paths("/a", "/a", PathStyle::Json), Ordering::Equal);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut msgs = vec![
            side(3, "/a/10"),
            side(1, "/a/9"),
            side(2, "/a/10"),
            side(0, "/a"),
        ];
        sort_messages(&mut msgs, PathStyle::Json);
        let order: Vec<u64> = msgs.iter().map(|m| m.order_id).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        let before = msgs.clone();
        sort_messages(&mut msgs, PathStyle::Json);
        assert_eq!(msgs, before);
    }

    #[test]
    fn test_is_under() {
        assert!(is_under("/a/b/c", "/a/b", PathStyle::Json));
        assert!(is_under("/a/b", "/a/b", PathStyle::Json));
        assert!(!is_under("/a/bc", "/a/b", PathStyle::Json));
        assert!(is_under("/r[1]/x[2]/@id", "/r[1]/x[2]", PathStyle::XPath));
    }

    #[test]
    fn test_sort_key_strips_parent_marker() {
        let msg = DiffMessage::new(1, "/a/0", "parent:/a", ResultType::Missed)
            .for_side(Side::Actual)
            .unwrap();
        assert_eq!(sort_key(&msg), "/a");
    }
}
