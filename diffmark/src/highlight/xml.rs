//! XML reconstruction.
//!
//! Diffs address nodes by XPath. Markers go on the addressed element, text,
//! comment or attribute. A `MISSED`/`EXTRA` diff whose path on the rendered
//! side is `parent:<xpath>` copies the origin node from the other document
//! and splices it under that parent, at the origin node's position among its
//! non-comment siblings.

use log::{debug, trace};
use rustc_hash::FxHashMap;

use super::markup::Marker;
use super::{insertion_plan, side_messages, Highlighted, Reconstructor, RenderedSide};
use crate::error::Result;
use crate::message::{DiffMessage, Side, SideMessage};
use crate::node::{NodeId, XmlDocument, XmlTarget};
use crate::path::{PathStyle, XPath};
use crate::rules::HighlightRules;
use crate::xml::{
    apply_sort_rules, parse_str, print_highlighted, sort_alphabetically, XmlMarkers,
};

/// A node of the other document waiting to be spliced into this one.
#[derive(Debug, Clone)]
pub struct NodeToInsert {
    /// The origin node, in the other document.
    pub source: NodeId,
    /// The parent it goes under, in this document.
    pub parent: NodeId,
    /// Position among the parent's non-comment children.
    pub index: usize,
    pub marker: Marker,
}

/// Highlights XML documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlReconstructor;

impl XmlReconstructor {
    fn parse(raw: &str, rules: &HighlightRules) -> Result<XmlDocument> {
        let mut doc = parse_str(&rules.apply_replacements(raw))?;
        apply_sort_rules(&mut doc, &rules.sort_rules);
        if rules.sort_alphabetically {
            sort_alphabetically(&mut doc);
        }
        Ok(doc)
    }

    /// Attaches `messages` to `doc`, splicing in copies from `other`.
    fn annotate(
        doc: &mut XmlDocument,
        other: &XmlDocument,
        messages: &[SideMessage],
    ) -> XmlMarkers {
        let mut markers = XmlMarkers::new();
        let mut pending: Vec<NodeToInsert> = Vec::new();

        for msg in messages {
            match msg.insertion_parent() {
                Some(parent) => {
                    if !msg.result.is_one_sided() {
                        debug!("diff {}: parent marker on a {} diff", msg.order_id, msg.result);
                        continue;
                    }
                    Self::plan_insertion(doc, other, msg, parent, &mut markers, &mut pending);
                }
                None => Self::mark(doc, msg, &mut markers),
            }
        }

        Self::apply_insertions(doc, other, pending, &mut markers);
        markers
    }

    fn mark(doc: &XmlDocument, msg: &SideMessage, markers: &mut XmlMarkers) {
        let target = XPath::parse(&msg.own_path).and_then(|p| doc.resolve(&p));
        match target {
            Some(XmlTarget::Node(id)) => {
                markers.mark_node(id, Marker::from_message(msg));
            }
            Some(XmlTarget::Attribute(id, name)) => {
                markers.mark_attribute(id, &name, Marker::from_message(msg));
            }
            None => debug!("diff {}: no node at {:?}", msg.order_id, msg.own_path),
        }
    }

    fn plan_insertion(
        doc: &mut XmlDocument,
        other: &XmlDocument,
        msg: &SideMessage,
        parent: &str,
        markers: &mut XmlMarkers,
        pending: &mut Vec<NodeToInsert>,
    ) {
        let parent_id = match XPath::parse(parent).and_then(|p| doc.resolve(&p)) {
            Some(XmlTarget::Node(id)) if doc.content(id).is_element() => id,
            _ => {
                debug!("diff {}: no insertion parent at {parent:?}", msg.order_id);
                return;
            }
        };
        let origin = XPath::parse(&msg.other_path).and_then(|p| other.resolve(&p));
        match origin {
            Some(XmlTarget::Node(source)) => {
                let Some(index) = other.significant_position(source) else {
                    debug!("diff {}: origin node is detached", msg.order_id);
                    return;
                };
                pending.push(NodeToInsert {
                    source,
                    parent: parent_id,
                    index,
                    marker: Marker::from_message(msg),
                });
            }
            Some(XmlTarget::Attribute(source, name)) => {
                // Attributes are unordered, so they are added right away.
                let value = other
                    .element(source)
                    .and_then(|e| e.attribute(&name))
                    .unwrap_or_default()
                    .to_string();
                let added = doc
                    .element_mut(parent_id)
                    .is_some_and(|e| e.add_attribute(name.as_str(), value));
                if added {
                    trace!("diff {}: synthesized attribute @{name}", msg.order_id);
                    markers.mark_attribute(parent_id, &name, Marker::from_message(msg));
                }
            }
            None => debug!("diff {}: no origin node at {:?}", msg.order_id, msg.other_path),
        }
    }

    /// Splices the pending copies, per parent, in reverse position order.
    fn apply_insertions(
        doc: &mut XmlDocument,
        other: &XmlDocument,
        pending: Vec<NodeToInsert>,
        markers: &mut XmlMarkers,
    ) {
        let mut by_parent: FxHashMap<NodeId, Vec<(usize, NodeToInsert)>> = FxHashMap::default();
        let mut parents: Vec<NodeId> = Vec::new();
        for item in pending {
            if !by_parent.contains_key(&item.parent) {
                parents.push(item.parent);
            }
            by_parent
                .entry(item.parent)
                .or_default()
                .push((item.index, item));
        }

        for parent in parents {
            let Some(items) = by_parent.remove(&parent) else {
                continue;
            };
            // Positions of the original non-comment children among all
            // children, plus the end.
            let children = doc.children(parent);
            let mut slots: Vec<usize> = doc
                .significant_children(parent)
                .iter()
                .filter_map(|c| children.iter().position(|x| x == c))
                .collect();
            slots.push(children.len());

            for (index, item) in insertion_plan(items, slots.len() - 1) {
                let copy = doc.import(other, item.source);
                doc.insert_child(parent, slots[index], copy);
                markers.mark_node(copy, item.marker);
                trace!("inserted placeholder under {parent:?} at {index}");
            }
        }
    }

    fn render(
        doc: &mut XmlDocument,
        other: &XmlDocument,
        messages: &[SideMessage],
    ) -> RenderedSide {
        let markers = Self::annotate(doc, other, messages);
        RenderedSide::Tree(print_highlighted(doc, &markers))
    }
}

impl Reconstructor for XmlReconstructor {
    fn highlight(
        &self,
        diffs: &[DiffMessage],
        expected: &str,
        actual: &str,
        rules: &HighlightRules,
    ) -> Result<Highlighted> {
        let expected = Self::parse(expected, rules)?;
        let actual = Self::parse(actual, rules)?;

        let er_messages = side_messages(diffs, Side::Expected, rules, PathStyle::XPath);
        let ar_messages = side_messages(diffs, Side::Actual, rules, PathStyle::XPath);

        // Each side splices copies from a pristine view of the other side.
        let mut er_doc = expected.clone();
        let er = Self::render(&mut er_doc, &actual, &er_messages);
        let mut ar_doc = actual;
        let ar = Self::render(&mut ar_doc, &expected, &ar_messages);

        Ok(Highlighted {
            er,
            ar,
            combined: None,
        })
    }
}
