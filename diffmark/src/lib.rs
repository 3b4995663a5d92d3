//! diffmark - Side-by-side difference highlighting
//!
//! This library turns a flat, path-addressed list of differences between an
//! "expected" (er) and an "actual" (ar) artifact into a highlighted rendering
//! of both sides.
//!
//! # Overview
//!
//! Four document shapes are supported: XML, JSON, named tables and text
//! (plain lines or character-level full text). Each difference is a
//! [`DiffMessage`] naming a position in one or both documents. The
//! reconstructors parse both documents, attach a marker to every addressed
//! node, and splice placeholders for one-sided content into the other side so
//! both renderings stay aligned.
//!
//! For XML, the [`NodeMatcher`] decides which expected element corresponds
//! to which actual element, so that an external tree-diff can produce the
//! difference list in the first place.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use diffmark::{highlight, DiffMessage, Format, ResultType};
//!
//! let diffs = vec![DiffMessage::new(1, "2", "2", ResultType::Modified)];
//! let out = highlight(Format::Text, &diffs, "foo\nbar", "foo\nbaz", &HashMap::new())?;
//! assert_eq!(
//!     out.ar.to_html(),
//!     "foo\n<span class=\"MODIFIED\" data-order-id=\"1\">baz</span>"
//! );
//! # Ok::<(), diffmark::Error>(())
//! ```

pub mod constants;
pub mod error;
pub mod highlight;
pub mod json;
pub mod matching;
pub mod message;
pub mod node;
pub mod path;
pub mod rules;
pub mod table;
pub mod text;
pub mod xml;

// Re-export commonly used types
pub use error::{Error, Result};
pub use highlight::{
    highlight, Format, Highlighted, HighlighterNode, HighlighterTree, JsonReconstructor,
    Reconstructor, RenderedSide, TableReconstructor, TextMode, TextReconstructor, XmlReconstructor,
};
pub use matching::{KeyRule, KeyRules, NodeHandle, NodeMatcher, Selector};
pub use message::{DiffMessage, ResultType, Side};
pub use node::{NodeId, XmlContent, XmlDocument, XmlElement};
pub use rules::HighlightRules;
pub use xml::{parse_str, XmlParser};
