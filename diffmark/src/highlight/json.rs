//! JSON reconstruction.
//!
//! Each side is pretty-printed one member or element per line, with marked
//! nodes wrapped in spans. A `MISSED`/`EXTRA` diff with a `parent:<path>`
//! on the rendered side inserts into that container: into an array, a copy
//! of the origin value at the origin index; into an object, an empty
//! placeholder row at the origin member's position, so no key is invented.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::markup::{escape, wrap_opt, Marker};
use super::{insertion_plan, side_messages, Highlighted, Reconstructor, RenderedSide};
use crate::constants::INDENT;
use crate::error::Result;
use crate::json::{JsonDocument, JsonKind, JsonNodeId};
use crate::message::{DiffMessage, Side, SideMessage};
use crate::path::{JsonPath, JsonSegment, PathStyle};
use crate::rules::HighlightRules;

/// A value of the other document, or an empty row, waiting to be inserted.
#[derive(Debug, Clone)]
struct PendingValue {
    source: Option<JsonNodeId>,
    marker: Marker,
}

/// Highlights JSON documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReconstructor;

impl JsonReconstructor {
    fn parse(raw: &str, rules: &HighlightRules) -> Result<JsonDocument> {
        let mut doc = JsonDocument::parse(&rules.apply_replacements(raw))?;
        if rules.sort_alphabetically {
            doc.sort_keys();
        }
        Ok(doc)
    }

    fn annotate(
        doc: &mut JsonDocument,
        other: &JsonDocument,
        messages: &[SideMessage],
    ) -> FxHashMap<JsonNodeId, Marker> {
        let mut markers: FxHashMap<JsonNodeId, Marker> = FxHashMap::default();
        let mut pending: FxHashMap<JsonNodeId, Vec<(usize, PendingValue)>> = FxHashMap::default();
        let mut parents: Vec<JsonNodeId> = Vec::new();

        for msg in messages {
            if let Some(parent) = msg.insertion_parent() {
                if !msg.result.is_one_sided() {
                    debug!("diff {}: parent marker on a {} diff", msg.order_id, msg.result);
                    continue;
                }
                let Some(parent_id) = JsonPath::parse(parent).and_then(|p| doc.resolve(&p)) else {
                    debug!("diff {}: no insertion parent at {parent:?}", msg.order_id);
                    continue;
                };
                let Some((index, value)) = Self::pending_value(doc, other, parent_id, msg) else {
                    continue;
                };
                if !pending.contains_key(&parent_id) {
                    parents.push(parent_id);
                }
                pending.entry(parent_id).or_default().push((index, value));
                continue;
            }

            match JsonPath::parse(&msg.own_path).and_then(|p| doc.resolve(&p)) {
                Some(id) => {
                    markers.entry(id).or_insert_with(|| Marker::from_message(msg));
                }
                None => debug!("diff {}: no node at {:?}", msg.order_id, msg.own_path),
            }
        }

        for parent in parents {
            let Some(items) = pending.remove(&parent) else {
                continue;
            };
            let len = doc.children(parent).len();
            for (index, item) in insertion_plan(items, len) {
                let id = match item.source {
                    Some(source) => doc.import(other, source, false),
                    None => doc.new_node(None, JsonKind::Placeholder),
                };
                doc.insert_child(parent, index, id);
                markers.insert(id, item.marker);
                trace!("inserted placeholder at {index}");
            }
        }
        markers
    }

    /// Works out what goes into `parent` for an insertion diff, and at
    /// which origin position.
    fn pending_value(
        doc: &JsonDocument,
        other: &JsonDocument,
        parent: JsonNodeId,
        msg: &SideMessage,
    ) -> Option<(usize, PendingValue)> {
        let origin_path = JsonPath::parse(&msg.other_path);
        let origin = origin_path.as_ref().and_then(|p| other.resolve(p));
        let marker = Marker::from_message(msg);

        match doc.node(parent).kind {
            JsonKind::Array => {
                let index = match origin_path.as_ref().and_then(JsonPath::last) {
                    Some(JsonSegment::Index(i)) => *i,
                    _ => origin.and_then(|o| other.position(o))?,
                };
                Some((
                    index,
                    PendingValue {
                        source: origin,
                        marker,
                    },
                ))
            }
            JsonKind::Object => {
                let index = origin
                    .and_then(|o| other.position(o))
                    .unwrap_or(usize::MAX);
                Some((
                    index,
                    PendingValue {
                        source: None,
                        marker,
                    },
                ))
            }
            _ => {
                debug!("diff {}: insertion parent is not a container", msg.order_id);
                None
            }
        }
    }

    fn render(doc: &JsonDocument, markers: &FxHashMap<JsonNodeId, Marker>) -> String {
        let mut lines = Vec::new();
        if let Some(root) = doc.root() {
            let mut printer = JsonPrinter {
                doc,
                markers,
                lines: &mut lines,
            };
            printer.print(root, 0, None, false);
        }
        lines.join("\n")
    }
}

struct JsonPrinter<'a> {
    doc: &'a JsonDocument,
    markers: &'a FxHashMap<JsonNodeId, Marker>,
    lines: &'a mut Vec<String>,
}

impl JsonPrinter<'_> {
    fn print(&mut self, id: JsonNodeId, depth: usize, inherited: Option<Marker>, comma: bool) {
        let doc = self.doc;
        let node = doc.node(id);
        let marker = self.markers.get(&id).cloned().or(inherited);
        let indent = INDENT.repeat(depth);
        let comma = if comma { "," } else { "" };
        let key = match &node.key {
            Some(k) => format!("{}: ", serde_json::Value::from(k.as_str())),
            None => String::new(),
        };

        let (open, close) = match &node.kind {
            JsonKind::Scalar(value) => {
                let text = escape(&format!("{key}{value}{comma}")).into_owned();
                self.push(&indent, marker.as_ref(), &text);
                return;
            }
            JsonKind::Placeholder => {
                self.push(&indent, marker.as_ref(), "");
                return;
            }
            JsonKind::Object => ("{", "}"),
            JsonKind::Array => ("[", "]"),
        };

        if node.children.is_empty() {
            let text = escape(&format!("{key}{open}{close}{comma}")).into_owned();
            self.push(&indent, marker.as_ref(), &text);
            return;
        }

        self.push(&indent, marker.as_ref(), &escape(&format!("{key}{open}")));
        let inner = marker.as_ref().and_then(Marker::inheritance);
        let children = &node.children;
        for (i, child) in children.iter().enumerate() {
            // Placeholders hold no value, so they never need a comma
            // before them.
            let needs_comma = children[i + 1..]
                .iter()
                .any(|c| doc.node(*c).kind != JsonKind::Placeholder);
            self.print(*child, depth + 1, inner.clone(), needs_comma);
        }
        let close_marker = marker.as_ref().map(|m| Marker::inherited(m.result));
        self.push(&indent, close_marker.as_ref(), &format!("{close}{comma}"));
    }

    fn push(&mut self, indent: &str, marker: Option<&Marker>, html: &str) {
        self.lines.push(format!("{indent}{}", wrap_opt(marker, html)));
    }
}

impl Reconstructor for JsonReconstructor {
    fn highlight(
        &self,
        diffs: &[DiffMessage],
        expected: &str,
        actual: &str,
        rules: &HighlightRules,
    ) -> Result<Highlighted> {
        let expected = Self::parse(expected, rules)?;
        let actual = Self::parse(actual, rules)?;

        let er_messages = side_messages(diffs, Side::Expected, rules, PathStyle::Json);
        let ar_messages = side_messages(diffs, Side::Actual, rules, PathStyle::Json);

        let mut er_doc = expected.clone();
        let er_markers = Self::annotate(&mut er_doc, &actual, &er_messages);
        let mut ar_doc = actual;
        let ar_markers = Self::annotate(&mut ar_doc, &expected, &ar_messages);

        Ok(Highlighted {
            er: RenderedSide::Html(Self::render(&er_doc, &er_markers)),
            ar: RenderedSide::Html(Self::render(&ar_doc, &ar_markers)),
            combined: None,
        })
    }
}
