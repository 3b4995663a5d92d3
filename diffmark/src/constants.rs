//! Constants used throughout diffmark.

/// Tag name of the synthetic element that holds the top-level XML nodes.
pub const XML_ROOT_TAG: &str = "$ROOT$";

/// Prefix of a path that names the parent an insertion goes under.
pub const PARENT_MARKER: &str = "parent:";

/// Marker between a line number and a placeholder line count in text paths.
pub const EMPTY_MARKER: &str = "empty";

/// Separator inside `regex==replacement` style rule values.
pub const RULE_SEPARATOR: &str = "==";

/// Column id used by row-level table diffs.
pub const WHOLE_ROW: i64 = -1;

/// CSS class for text blocks excluded from comparison.
pub const EXCLUDED_CLASS: &str = "EXCLUDED";

/// CSS class of the separator row in a combined table view.
pub const SEPARATOR_CLASS: &str = "separator";

/// Label of the separator row in a combined table view.
pub const COMBINED_SEPARATOR_LABEL: &str = "ar";

/// Indentation unit for rendered JSON and XML.
pub const INDENT: &str = "  ";

/// Recognized rule keys.
pub mod rule_keys {
    pub const EXCLUDE_PATH: &str = "exclude-path";
    pub const SORT: &str = "sort";
    pub const SORT_ALPHABETICALLY: &str = "sort-alphabetically";
    pub const REPLACE: &str = "replace";
    pub const EXCLUDE_TEXT_BLOCK: &str = "exclude-text-block";
    pub const POC_COLUMNS: &str = "poc-columns";
}
