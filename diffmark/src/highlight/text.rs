//! Plain and full-text reconstruction.
//!
//! Every line becomes one row of a [`HighlighterTree`]. Diffs address line
//! ranges; `N-emptyK` inserts K placeholder rows before line N so the two
//! sides stay aligned. In full-text mode a range may also carry character
//! intervals for its first line, and only those characters are marked.

use std::collections::BTreeMap;

use log::debug;
use rustc_hash::FxHashMap;

use super::markup::{escape, excluded, Marker};
use super::tree::HighlighterTree;
use super::{side_messages, Highlighted, Reconstructor, RenderedSide};
use crate::error::Result;
use crate::message::{DiffMessage, ResultType, Side, SideMessage};
use crate::path::{CharInterval, PathStyle, TextRange};
use crate::rules::{HighlightRules, TextBlock};
use crate::text::TextDocument;

/// How finely text diffs are addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMode {
    /// Whole lines.
    #[default]
    Plain,
    /// Lines, plus character intervals within a line.
    Full,
}

/// Highlights line-oriented text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReconstructor {
    mode: TextMode,
}

/// Markers of one side, keyed by 1-based line.
#[derive(Debug, Default)]
struct TextMarkers {
    lines: FxHashMap<usize, Marker>,
    intervals: FxHashMap<usize, Vec<(CharInterval, Marker)>>,
    /// Placeholder rows to emit before a line.
    insertions: BTreeMap<usize, Vec<(usize, Marker)>>,
    /// Multi-line ranges whose first and last rows get linked.
    ranges: Vec<(usize, usize)>,
}

impl TextReconstructor {
    /// Creates a reconstructor for `mode`.
    pub fn new(mode: TextMode) -> Self {
        TextReconstructor { mode }
    }

    /// Collects the markers of one side. `other_len` is the line count of
    /// the other side, which bounds how many placeholder lines one diff can
    /// ask for.
    fn annotate(
        &self,
        doc: &TextDocument,
        other_len: usize,
        messages: &[SideMessage],
        rules: &HighlightRules,
    ) -> TextMarkers {
        let mut markers = TextMarkers::default();
        for msg in messages {
            let Some(range) = TextRange::parse(&msg.own_path) else {
                debug!("diff {}: malformed range {:?}", msg.order_id, msg.own_path);
                continue;
            };
            if rules.text_block_for(range.start).is_some() {
                debug!("diff {}: line {} is excluded", msg.order_id, range.start);
                continue;
            }
            if let Some(count) = range.empty {
                if count > other_len {
                    debug!(
                        "diff {}: {count} placeholder lines, other side has {other_len}",
                        msg.order_id
                    );
                    continue;
                }
                markers
                    .insertions
                    .entry(range.start)
                    .or_default()
                    .push((count, Marker::from_message(msg)));
                continue;
            }
            if range.start > doc.len() {
                debug!("diff {}: no line {}", msg.order_id, range.start);
                continue;
            }

            let end = range.end.min(doc.len());
            let by_interval = self.mode == TextMode::Full && !range.intervals.is_empty();
            let first_whole_line = if by_interval {
                let on_line = markers.intervals.entry(range.start).or_default();
                for interval in &range.intervals {
                    on_line.push((*interval, Marker::from_message(msg)));
                }
                range.start + 1
            } else {
                range.start
            };
            for line in first_whole_line..=end {
                markers
                    .lines
                    .entry(line)
                    .or_insert_with(|| Marker::from_message(msg));
            }
            if end > range.start {
                markers.ranges.push((range.start, end));
            }
        }
        markers
    }

    fn render(
        &self,
        doc: &TextDocument,
        markers: &TextMarkers,
        rules: &HighlightRules,
    ) -> HighlighterTree {
        let mut tree = HighlighterTree::new();
        let root = tree.root();
        let mut row_of_line: FxHashMap<usize, usize> = FxHashMap::default();

        let emit_placeholders = |tree: &mut HighlighterTree, list: &[(usize, Marker)]| {
            for (count, marker) in list {
                for i in 0..*count {
                    let marker = if i == 0 {
                        marker.clone()
                    } else {
                        Marker::inherited(marker.result)
                    };
                    tree.add_row(root, marker.wrap(""), marker.status(), None);
                }
            }
        };

        for (number, line) in doc.lines().iter().enumerate() {
            let number = number + 1;
            if let Some(list) = markers.insertions.get(&number) {
                emit_placeholders(&mut tree, list);
            }
            let (value, status) = match rules.text_block_for(number) {
                Some(block) => (render_excluded(line, block), ResultType::Identical),
                None => render_line(
                    line,
                    markers.lines.get(&number),
                    markers.intervals.get(&number),
                ),
            };
            let row = tree.add_row(root, value, status, Some(number.to_string()));
            row_of_line.insert(number, row);
        }
        for (_, list) in markers.insertions.range(doc.len() + 1..) {
            emit_placeholders(&mut tree, list);
        }

        for (start, end) in &markers.ranges {
            if let (Some(a), Some(b)) = (row_of_line.get(start), row_of_line.get(end)) {
                tree.link(*a, *b);
            }
        }
        tree
    }

    fn render_side(
        &self,
        doc: &TextDocument,
        other: &TextDocument,
        diffs: &[DiffMessage],
        side: Side,
        rules: &HighlightRules,
    ) -> RenderedSide {
        let messages = side_messages(diffs, side, rules, PathStyle::Text);
        let markers = self.annotate(doc, other.len(), &messages, rules);
        RenderedSide::Tree(self.render(doc, &markers, rules))
    }
}

fn render_line(
    line: &str,
    marker: Option<&Marker>,
    intervals: Option<&Vec<(CharInterval, Marker)>>,
) -> (String, ResultType) {
    if let Some(m) = marker {
        return (m.wrap(&escape(line)), m.status());
    }
    let chars: Vec<char> = line.chars().collect();
    let mut spans: Vec<&(CharInterval, Marker)> = intervals
        .map(|list| list.iter().filter(|(iv, _)| iv.start < chars.len()).collect())
        .unwrap_or_default();
    if spans.is_empty() {
        return (escape(line).into_owned(), ResultType::Identical);
    }
    spans.sort_by_key(|(iv, _)| iv.start);

    let status = spans[0].1.status();
    let mut out = String::new();
    let mut cursor = 0;
    for (interval, marker) in spans {
        let end = interval.end.min(chars.len() - 1);
        if end < cursor {
            continue;
        }
        let start = interval.start.max(cursor);
        out.push_str(&escape(&collect(&chars[cursor..start])));
        out.push_str(&marker.wrap(&escape(&collect(&chars[start..=end]))));
        cursor = end + 1;
    }
    out.push_str(&escape(&collect(&chars[cursor..])));
    (out, status)
}

fn render_excluded(line: &str, block: &TextBlock) -> String {
    let chars: Vec<char> = line.chars().collect();
    match block.cursor {
        Some(cursor) if cursor.start < chars.len() => {
            let end = cursor.end.min(chars.len() - 1);
            format!(
                "{}{}{}",
                escape(&collect(&chars[..cursor.start])),
                excluded(&escape(&collect(&chars[cursor.start..=end]))),
                escape(&collect(&chars[end + 1..]))
            )
        }
        Some(_) => escape(line).into_owned(),
        None => excluded(&escape(line)),
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

impl Reconstructor for TextReconstructor {
    fn highlight(
        &self,
        diffs: &[DiffMessage],
        expected: &str,
        actual: &str,
        rules: &HighlightRules,
    ) -> Result<Highlighted> {
        let expected = TextDocument::parse(&rules.apply_replacements(expected));
        let actual = TextDocument::parse(&rules.apply_replacements(actual));
        Ok(Highlighted {
            er: self.render_side(&expected, &actual, diffs, Side::Expected, rules),
            ar: self.render_side(&actual, &expected, diffs, Side::Actual, rules),
            combined: None,
        })
    }
}
