//! XML parsing, reordering and highlighted output.
//!
//! Documents are parsed into [`XmlDocument`](crate::node::XmlDocument)
//! arenas, optionally reordered by the configured sort rules, and printed
//! as highlighter rows once markers are attached.

mod parser;
mod printer;
mod sort;

pub use parser::{parse_str, XmlParser};
pub use printer::{print_highlighted, HighlightPrinter, XmlMarkers};
pub use sort::{apply_sort_rules, sort_alphabetically};
