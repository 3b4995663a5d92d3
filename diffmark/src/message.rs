//! Difference records shared by every reconstructor.
//!
//! A [`DiffMessage`] names one structural difference between the expected
//! (er) and the actual (ar) artifact. Its paths are format specific; see the
//! [`crate::path`] codecs for the grammars.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outcome of comparing one position in both documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    /// Both sides are equal.
    Identical,
    /// Equal after normalization.
    Similar,
    /// Present on both sides with different content.
    Modified,
    /// Present in expected, absent from actual.
    Missed,
    /// Present in actual, absent from expected.
    Extra,
    /// The comparator failed at this position.
    Error,
    /// Comparison was skipped; never rendered.
    Skipped,
    /// Part of a synthesized insertion; rendered without a marker.
    Hidden,
}

impl ResultType {
    /// All result types in declaration order.
    pub const ALL: [ResultType; 8] = [
        ResultType::Identical,
        ResultType::Similar,
        ResultType::Modified,
        ResultType::Missed,
        ResultType::Extra,
        ResultType::Error,
        ResultType::Skipped,
        ResultType::Hidden,
    ];

    /// The upper-case name, also used as the CSS class of a marker.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Identical => "IDENTICAL",
            ResultType::Similar => "SIMILAR",
            ResultType::Modified => "MODIFIED",
            ResultType::Missed => "MISSED",
            ResultType::Extra => "EXTRA",
            ResultType::Error => "ERROR",
            ResultType::Skipped => "SKIPPED",
            ResultType::Hidden => "HIDDEN",
        }
    }

    /// Returns true if a target with this status gets a visible marker.
    pub fn is_difference(&self) -> bool {
        !matches!(
            self,
            ResultType::Identical | ResultType::Skipped | ResultType::Hidden
        )
    }

    /// Returns true for results that describe content on one side only.
    pub fn is_one_sided(&self) -> bool {
        matches!(self, ResultType::Missed | ResultType::Extra)
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResultType::ALL
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown result type: {s}"))
    }
}

/// One structural difference between er and ar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffMessage {
    /// Stable sequence number; tie-break for sorting and anchor id.
    pub order_id: u64,
    /// Position in the expected document, empty if not applicable.
    #[serde(default)]
    pub expected_path: String,
    /// Position in the actual document, empty if not applicable.
    #[serde(default)]
    pub actual_path: String,
    /// Kind of difference.
    pub result: ResultType,
    /// Free text shown as a tooltip.
    #[serde(default)]
    pub description: String,
}

impl DiffMessage {
    /// Creates a message without a description.
    pub fn new(
        order_id: u64,
        expected_path: impl Into<String>,
        actual_path: impl Into<String>,
        result: ResultType,
    ) -> Self {
        DiffMessage {
            order_id,
            expected_path: expected_path.into(),
            actual_path: actual_path.into(),
            result,
            description: String::new(),
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the path that applies to `side`.
    pub fn path(&self, side: Side) -> &str {
        match side {
            Side::Expected => &self.expected_path,
            Side::Actual => &self.actual_path,
        }
    }

    /// Returns a copy of this message seen from `side`, or `None` when the
    /// message does not apply to that side or was skipped.
    pub fn for_side(&self, side: Side) -> Option<SideMessage> {
        if self.result == ResultType::Skipped || self.path(side).trim().is_empty() {
            return None;
        }
        Some(SideMessage {
            order_id: self.order_id,
            own_path: self.path(side).trim().to_string(),
            other_path: self.path(side.other()).trim().to_string(),
            result: self.result,
            description: self.description.clone(),
        })
    }
}

/// Which document is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The expected result (er).
    Expected,
    /// The actual result (ar).
    Actual,
}

impl Side {
    /// Both sides, expected first.
    pub const BOTH: [Side; 2] = [Side::Expected, Side::Actual];

    /// Returns the opposite side.
    pub fn other(&self) -> Side {
        match self {
            Side::Expected => Side::Actual,
            Side::Actual => Side::Expected,
        }
    }
}

/// A [`DiffMessage`] normalized to the side being rendered: `own_path`
/// always addresses the rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideMessage {
    pub order_id: u64,
    pub own_path: String,
    pub other_path: String,
    pub result: ResultType,
    pub description: String,
}

impl SideMessage {
    /// Returns the insertion parent if the own path carries the
    /// `parent:` marker.
    pub fn insertion_parent(&self) -> Option<&str> {
        self.own_path
            .strip_prefix(crate::constants::PARENT_MARKER)
            .map(str::trim)
    }
}

/// Filters `diffs` down to those applying to `side`, normalized.
pub fn messages_for_side(diffs: &[DiffMessage], side: Side) -> Vec<SideMessage> {
    diffs.iter().filter_map(|d| d.for_side(side)).collect()
}
