//! Reordering of element children before diffs are attached.
//!
//! Both documents are sorted the same way the comparator sorted them, so
//! the XPaths in the diff list address the same nodes here. Only the
//! reordered elements move; text and comments keep their slots.

use std::cmp::Ordering;

use crate::node::{NodeId, XmlDocument};
use crate::rules::SortRule;

/// Applies every sort rule to `doc`.
pub fn apply_sort_rules(doc: &mut XmlDocument, rules: &[SortRule]) {
    for rule in rules {
        let parents: Vec<NodeId> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|id| doc.name(*id) == Some(rule.parent.as_str()))
            .collect();
        for parent in parents {
            permute_slots(
                doc,
                parent,
                |doc, id| doc.name(id) == Some(rule.child.as_str()),
                |doc, a, b| {
                    rule.key
                        .extract(doc, a)
                        .cmp(&rule.key.extract(doc, b))
                },
            );
        }
    }
}

/// Sorts the element children of every element by name, then text.
pub fn sort_alphabetically(doc: &mut XmlDocument) {
    let elements: Vec<NodeId> = doc
        .descendants(doc.root())
        .into_iter()
        .filter(|id| doc.content(*id).is_element())
        .collect();
    for parent in elements {
        permute_slots(
            doc,
            parent,
            |doc, id| doc.content(id).is_element(),
            |doc, a, b| {
                doc.name(a)
                    .cmp(&doc.name(b))
                    .then_with(|| doc.text_content(a).cmp(&doc.text_content(b)))
            },
        );
    }
}

/// Stably sorts the children of `parent` selected by `movable`, keeping
/// every other child at its position.
fn permute_slots<F, C>(doc: &mut XmlDocument, parent: NodeId, movable: F, compare: C)
where
    F: Fn(&XmlDocument, NodeId) -> bool,
    C: Fn(&XmlDocument, NodeId, NodeId) -> Ordering,
{
    let children = doc.children(parent).to_vec();
    let mut sorted: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|c| movable(doc, *c))
        .collect();
    if sorted.len() < 2 {
        return;
    }
    sorted.sort_by(|a, b| compare(doc, *a, *b));

    let mut next = sorted.into_iter();
    let reordered: Vec<NodeId> = children
        .iter()
        .map(|c| {
            if movable(doc, *c) {
                next.next().unwrap_or(*c)
            } else {
                *c
            }
        })
        .collect();
    doc.reorder_children(parent, reordered);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn texts(doc: &XmlDocument, parent: NodeId) -> Vec<String> {
        doc.children(parent)
            .iter()
            .map(|c| doc.text_content(*c))
            .collect()
    }

    #[test]
    fn test_sort_rule_by_attribute() {
        let mut doc = parse_str(
            r#"<orders><order id="3">c</order><note>n</note><order id="1">a</order></orders>"#,
        )
        .unwrap();
        let rule = SortRule::parse("orders/order==@id").unwrap();
        apply_sort_rules(&mut doc, &[rule]);
        let orders = doc.children(doc.root())[0];
        assert_eq!(texts(&doc, orders), vec!["a", "n", "c"]);
    }

    #[test]
    fn test_sort_rule_other_parents_untouched() {
        let mut doc =
            parse_str(r#"<r><list><order id="2"/><order id="1"/></list></r>"#).unwrap();
        let before = doc.xpath_of(doc.descendants(doc.root())[3]).to_string();
        apply_sort_rules(&mut doc, &[SortRule::parse("orders/order==@id").unwrap()]);
        let after = doc.xpath_of(doc.descendants(doc.root())[3]).to_string();
        assert_eq!(before, after);
    }

    #[test]
    fn test_sort_alphabetically_keeps_text_slots() {
        let mut doc = parse_str("<r>lead<b>2</b><a>9</a><b>1</b><!-- c --></r>").unwrap();
        sort_alphabetically(&mut doc);
        let r = doc.children(doc.root())[0];
        assert_eq!(texts(&doc, r), vec!["lead", "9", "1", "2", ""]);
        assert!(doc.is_comment(doc.children(r)[4]));
    }
}
