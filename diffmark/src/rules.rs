//! Rendering rules parsed from a `map<string, [string]>`.
//!
//! Every recognized key is validated up front, so a bad rule aborts the call
//! before anything is rendered. Unrecognized keys are ignored.

use std::borrow::Cow;
use std::collections::HashMap;

use log::debug;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::constants::{rule_keys, RULE_SEPARATOR};
use crate::error::{Error, Result};
use crate::matching::KeyExpr;
use crate::path::{is_under, CharInterval, PathStyle, TextRange};

/// A `regex==replacement` rule applied to raw documents.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub regex: Regex,
    pub replacement: String,
}

/// Reorders `child` elements of every `parent` element by a key.
#[derive(Debug, Clone)]
pub struct SortRule {
    pub parent: String,
    pub child: String,
    pub key: KeyExpr,
}

impl SortRule {
    /// Parses `parent/child==keyExpr`.
    pub fn parse(value: &str) -> Result<SortRule> {
        let (target, key) = split_rule(rule_keys::SORT, value)?;
        let (parent, child) = target
            .split_once('/')
            .map(|(p, c)| (p.trim(), c.trim()))
            .filter(|(p, c)| !p.is_empty() && !c.is_empty())
            .ok_or_else(|| {
                Error::Config(format!("sort rule target must be parent/child: {value:?}"))
            })?;
        let key = KeyExpr::parse(key)
            .ok_or_else(|| Error::Config(format!("invalid sort key: {value:?}")))?;
        Ok(SortRule {
            parent: parent.to_string(),
            child: child.to_string(),
            key,
        })
    }
}

/// A block of text lines excluded from comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// First line, 1-based.
    pub start: usize,
    /// Last line, inclusive.
    pub end: usize,
    /// Character interval applied on every line; `None` means whole lines.
    pub cursor: Option<CharInterval>,
}

impl TextBlock {
    /// Parses `line:A-B` or `line:A-B,cursor:C-D`.
    pub fn parse(value: &str) -> Result<TextBlock> {
        let invalid = || Error::Config(format!("invalid text block rule: {value:?}"));
        let (lines, cursor) = match value.split_once(",cursor:") {
            Some((l, c)) => (l, Some(c)),
            None => (value, None),
        };
        let lines = lines.trim().strip_prefix("line:").ok_or_else(invalid)?;
        let range = TextRange::parse(lines)
            .filter(|r| !r.is_insertion() && r.intervals.is_empty())
            .ok_or_else(invalid)?;
        let cursor = match cursor {
            None => None,
            Some(c) => {
                let intervals = TextRange::parse_intervals(c).ok_or_else(invalid)?;
                match intervals.as_slice() {
                    [one] => Some(*one),
                    _ => return Err(invalid()),
                }
            }
        };
        Ok(TextBlock {
            start: range.start,
            end: range.end,
            cursor,
        })
    }

    /// Returns true if `line` is inside the block.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

/// Parsed, validated rendering rules.
#[derive(Debug, Clone, Default)]
pub struct HighlightRules {
    pub exclude_paths: Vec<String>,
    pub sort_rules: Vec<SortRule>,
    pub sort_alphabetically: bool,
    pub replacements: Vec<Replacement>,
    pub text_blocks: Vec<TextBlock>,
    /// Allowed column headers by table check name.
    pub column_filters: FxHashMap<String, Vec<String>>,
}

impl HighlightRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates rules from a configuration map.
    pub fn from_map(map: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut rules = HighlightRules::new();
        for (key, values) in map {
            match key.as_str() {
                rule_keys::EXCLUDE_PATH => {
                    for value in values {
                        rules.exclude_paths.push(non_blank(key, value)?.to_string());
                    }
                }
                rule_keys::SORT => {
                    for value in values {
                        rules.sort_rules.push(SortRule::parse(value)?);
                    }
                }
                rule_keys::SORT_ALPHABETICALLY => {
                    for value in values {
                        rules.sort_alphabetically = match non_blank(key, value)? {
                            v if v.eq_ignore_ascii_case("true") => true,
                            v if v.eq_ignore_ascii_case("false") => false,
                            v => {
                                return Err(Error::Config(format!(
                                    "{key} expects true or false, got {v:?}"
                                )))
                            }
                        };
                    }
                }
                rule_keys::REPLACE => {
                    for value in values {
                        let (pattern, replacement) = split_rule(key, value)?;
                        rules.replacements.push(Replacement {
                            regex: Regex::new(pattern)?,
                            replacement: replacement.to_string(),
                        });
                    }
                }
                rule_keys::EXCLUDE_TEXT_BLOCK => {
                    for value in values {
                        rules.text_blocks.push(TextBlock::parse(value)?);
                    }
                }
                rule_keys::POC_COLUMNS => {
                    for value in values {
                        let (check, columns) = split_rule(key, value)?;
                        let columns = columns
                            .split(',')
                            .map(str::trim)
                            .filter(|c| !c.is_empty())
                            .map(str::to_string);
                        rules
                            .column_filters
                            .entry(check.to_string())
                            .or_default()
                            .extend(columns);
                    }
                }
                other => debug!("ignoring unrecognized rule key {other:?}"),
            }
        }
        Ok(rules)
    }

    /// Applies every replace rule, in order, to a raw document.
    pub fn apply_replacements<'a>(&self, raw: &'a str) -> Cow<'a, str> {
        if self.replacements.is_empty() {
            return Cow::Borrowed(raw);
        }
        let mut text = raw.to_string();
        for r in &self.replacements {
            text = r
                .regex
                .replace_all(&text, r.replacement.as_str())
                .into_owned();
        }
        Cow::Owned(text)
    }

    /// Returns true if `path` lies under an excluded path.
    ///
    /// An XPath exclusion written without `[n]` predicates matches every
    /// indexed occurrence.
    pub fn is_excluded(&self, path: &str, style: PathStyle) -> bool {
        self.exclude_paths.iter().any(|e| {
            if style == PathStyle::XPath && !e.contains('[') {
                is_under(&strip_predicates(path), e, style)
            } else {
                is_under(path, e, style)
            }
        })
    }

    /// Returns the text block containing `line`, if any.
    pub fn text_block_for(&self, line: usize) -> Option<&TextBlock> {
        self.text_blocks.iter().find(|b| b.contains_line(line))
    }

    /// Returns true if a cell diff on `column` survives the column filter
    /// configured for `check`.
    pub fn column_allowed(&self, check: Option<&str>, column: &str) -> bool {
        match check.and_then(|c| self.column_filters.get(c)) {
            Some(allowed) => allowed.iter().any(|a| a == column),
            None => true,
        }
    }
}

fn strip_predicates(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut depth = 0usize;
    for c in path.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn non_blank<'a>(key: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::Config(format!("blank value for rule {key}")));
    }
    Ok(value)
}

/// Splits `left==right`, both sides non-blank.
fn split_rule<'a>(key: &str, value: &'a str) -> Result<(&'a str, &'a str)> {
    let (left, right) = non_blank(key, value)?
        .split_once(RULE_SEPARATOR)
        .ok_or_else(|| Error::Config(format!("{key} rule needs '{RULE_SEPARATOR}': {value:?}")))?;
    if left.trim().is_empty() {
        return Err(Error::Config(format!("{key} rule has a blank left side: {value:?}")));
    }
    if right.trim().is_empty() && key != rule_keys::REPLACE {
        return Err(Error::Config(format!("{key} rule has a blank right side: {value:?}")));
    }
    let left = if key == rule_keys::REPLACE { left } else { left.trim() };
    Ok((left, right.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_recognized_keys() {
        let rules = HighlightRules::from_map(&map(&[
            ("exclude-path", &["/a/b"]),
            ("sort", &["orders/order==@id"]),
            ("sort-alphabetically", &["true"]),
            ("replace", &[r"\d{4}-\d{2}-\d{2}==DATE"]),
            ("exclude-text-block", &["line:2-3,cursor:0-4"]),
            ("poc-columns", &["amounts==price, qty"]),
            ("something-else", &["whatever"]),
        ]))
        .unwrap();

        assert_eq!(rules.exclude_paths, vec!["/a/b"]);
        assert_eq!(rules.sort_rules[0].parent, "orders");
        assert_eq!(rules.sort_rules[0].child, "order");
        assert!(rules.sort_alphabetically);
        assert_eq!(rules.apply_replacements("on 2024-01-31."), "on DATE.");
        assert_eq!(
            rules.text_blocks[0],
            TextBlock {
                start: 2,
                end: 3,
                cursor: Some(CharInterval { start: 0, end: 4 })
            }
        );
        assert!(rules.column_allowed(Some("amounts"), "qty"));
        assert!(!rules.column_allowed(Some("amounts"), "name"));
        assert!(rules.column_allowed(Some("other"), "name"));
        assert!(rules.column_allowed(None, "name"));
    }

    #[test]
    fn test_is_excluded() {
        let rules = HighlightRules::from_map(&map(&[("exclude-path", &["/a"])])).unwrap();
        assert!(rules.is_excluded("/a/0", PathStyle::Json));
        assert!(!rules.is_excluded("/ab", PathStyle::Json));
    }

    #[test]
    fn test_xpath_exclusion_ignores_indexes() {
        let rules =
            HighlightRules::from_map(&map(&[("exclude-path", &["/order/meta"])])).unwrap();
        assert!(rules.is_excluded("/order[1]/meta[2]/@ts", PathStyle::XPath));
        assert!(!rules.is_excluded("/order[1]/line[1]", PathStyle::XPath));

        let indexed =
            HighlightRules::from_map(&map(&[("exclude-path", &["/order[1]/line[2]"])])).unwrap();
        assert!(indexed.is_excluded("/order[1]/line[2]/text()[1]", PathStyle::XPath));
        assert!(!indexed.is_excluded("/order[1]/line[1]", PathStyle::XPath));
    }

    #[test]
    fn test_replace_with_empty_replacement() {
        let rules = HighlightRules::from_map(&map(&[("replace", &[r"\s+$=="])])).unwrap();
        assert_eq!(rules.apply_replacements("x  "), "x");
    }

    #[test]
    fn test_configuration_errors() {
        let bad: &[(&str, &[&str])] = &[
            ("replace", &["(unclosed==x"]),
            ("replace", &["no-separator"]),
            ("replace", &["==x"]),
            ("sort", &["orders==@id"]),
            ("sort", &["orders/order=="]),
            ("sort-alphabetically", &["maybe"]),
            ("exclude-path", &["  "]),
            ("exclude-text-block", &["lines:1-2"]),
            ("exclude-text-block", &["line:1-2,cursor:4-1"]),
            ("poc-columns", &["amounts"]),
        ];
        for entry in bad {
            assert!(
                HighlightRules::from_map(&map(std::slice::from_ref(entry))).is_err(),
                "{entry:?}"
            );
        }
        assert!(matches!(
            HighlightRules::from_map(&map(&[("replace", &["(unclosed==x"])])),
            Err(Error::Regex(_))
        ));
    }
}
