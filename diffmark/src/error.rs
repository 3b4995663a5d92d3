//! Error types for diffmark.

use thiserror::Error;

/// Result type alias for diffmark operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a highlighting call.
///
/// Problems with a single diff item (a malformed coordinate, a path that no
/// longer exists in the document) are never reported here; that item is
/// skipped and the rest of the rendering proceeds.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input document.
    #[error("parse error: {0}")]
    Parse(String),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON error from serde_json.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or blank rule value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Invalid regular expression in a replace rule.
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// The diff list does not describe the parsed documents.
    #[error("comparator error: {0}")]
    Comparator(String),
}
