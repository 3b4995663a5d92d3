//! Node correspondence matching.
//!
//! Given the children of two corresponding XML elements, the matcher decides
//! which control (expected) node "is" which test (actual) node, so that an
//! external tree-diff can compare the pairs and report everything left over
//! as missing or extra.
//!
//! Matching runs one [`Selector`] at a time across the whole sibling list.
//! A later selector only sees the control nodes that every earlier selector
//! failed to match, so a strong criterion (a record key) always wins over a
//! weak one (the tag name) even when the weak match would come first in
//! document order.

mod key_rule;
mod selectors;

pub use key_rule::{ChainStep, KeyExpr, KeyPart, KeyRule, KeyRules, ParentScope};
pub use selectors::{ByKeyRuleSelector, ByNameAndTextSelector, ByNameSelector};

use rustc_hash::FxHashSet;

use crate::node::{NodeId, XmlContent, XmlDocument};

/// A node together with the document it lives in.
#[derive(Debug, Clone, Copy)]
pub struct NodeHandle<'a> {
    pub doc: &'a XmlDocument,
    pub id: NodeId,
}

impl<'a> NodeHandle<'a> {
    /// Creates a handle.
    pub fn new(doc: &'a XmlDocument, id: NodeId) -> Self {
        NodeHandle { doc, id }
    }

    /// Returns the node content.
    pub fn content(&self) -> &'a XmlContent {
        self.doc.content(self.id)
    }

    /// Returns the element name, if the node is an element.
    pub fn name(&self) -> Option<&'a str> {
        self.doc.name(self.id)
    }

    /// Returns the parent node.
    pub fn parent(&self) -> Option<NodeHandle<'a>> {
        self.doc.parent(self.id).map(|p| NodeHandle::new(self.doc, p))
    }

    /// Returns the non-comment children.
    pub fn significant_children(&self) -> Vec<NodeHandle<'a>> {
        self.doc
            .significant_children(self.id)
            .into_iter()
            .map(|c| NodeHandle::new(self.doc, c))
            .collect()
    }

    /// Returns the recursive text content.
    pub fn text_content(&self) -> String {
        self.doc.text_content(self.id)
    }
}

/// A strategy deciding whether two nodes may be paired.
pub trait Selector {
    /// Returns true if `control` and `test` describe the same thing.
    fn can_be_compared(&self, control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool;
}

/// Pairs sibling nodes using an ordered list of selectors.
pub struct NodeMatcher {
    selectors: Vec<Box<dyn Selector>>,
}

impl Default for NodeMatcher {
    fn default() -> Self {
        Self::with_key_rules(KeyRules::new())
    }
}

impl NodeMatcher {
    /// Creates a matcher consulting `selectors` in order.
    pub fn new(selectors: Vec<Box<dyn Selector>>) -> Self {
        NodeMatcher { selectors }
    }

    /// Creates the standard chain: key rules, then name and text, then name.
    pub fn with_key_rules(rules: KeyRules) -> Self {
        Self::new(vec![
            Box::new(ByKeyRuleSelector::new(rules)),
            Box::new(ByNameAndTextSelector),
            Box::new(ByNameSelector),
        ])
    }

    /// Matches the children of two parents.
    pub fn match_children(
        &self,
        control_doc: &XmlDocument,
        control_parent: NodeId,
        test_doc: &XmlDocument,
        test_parent: NodeId,
    ) -> Vec<(NodeId, NodeId)> {
        self.match_nodes(
            control_doc,
            control_doc.children(control_parent),
            test_doc,
            test_doc.children(test_parent),
        )
    }

    /// Pairs `control` nodes with `test` nodes.
    ///
    /// Comments never take part. The result is ordered by control position;
    /// nodes left out are unmatched on their side.
    pub fn match_nodes(
        &self,
        control_doc: &XmlDocument,
        control: &[NodeId],
        test_doc: &XmlDocument,
        test: &[NodeId],
    ) -> Vec<(NodeId, NodeId)> {
        let control: Vec<NodeId> = control
            .iter()
            .copied()
            .filter(|c| !control_doc.is_comment(*c))
            .collect();
        let test: Vec<NodeId> = test
            .iter()
            .copied()
            .filter(|t| !test_doc.is_comment(*t))
            .collect();

        let mut matched_control: FxHashSet<usize> = FxHashSet::default();
        let mut claimed_test: FxHashSet<usize> = FxHashSet::default();
        let mut pairs: Vec<(usize, usize)> = Vec::new();

        for selector in &self.selectors {
            // Index just after the last match; searching starts here and
            // wraps around.
            let mut last_match = 0;
            for (ci, c) in control.iter().enumerate() {
                if matched_control.contains(&ci) {
                    continue;
                }
                let control_node = NodeHandle::new(control_doc, *c);
                let found = (last_match..test.len())
                    .chain(0..last_match)
                    .find(|ti| {
                        !claimed_test.contains(ti)
                            && selector
                                .can_be_compared(control_node, NodeHandle::new(test_doc, test[*ti]))
                    });
                if let Some(ti) = found {
                    matched_control.insert(ci);
                    claimed_test.insert(ti);
                    pairs.push((ci, ti));
                    last_match = ti + 1;
                }
            }
        }

        pairs.sort_unstable();
        pairs
            .into_iter()
            .map(|(ci, ti)| (control[ci], test[ti]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    fn list(doc: &XmlDocument) -> NodeId {
        doc.children(doc.root())[0]
    }

    fn texts(doc: &XmlDocument, ids: impl Iterator<Item = NodeId>) -> Vec<String> {
        ids.map(|id| doc.text_content(id)).collect()
    }

    #[test]
    fn test_key_rule_matching_ignores_order() {
        let control =
            parse_str(r#"<list><item id="A">1</item><item id="B">2</item></list>"#).unwrap();
        let test =
            parse_str(r#"<list><item id="B">2</item><item id="A">1</item></list>"#).unwrap();
        let mut rules = KeyRules::new();
        rules.add("item", "@id").unwrap();

        let pairs = NodeMatcher::with_key_rules(rules).match_children(
            &control,
            list(&control),
            &test,
            list(&test),
        );

        assert_eq!(pairs.len(), 2);
        for (c, t) in pairs {
            assert_eq!(
                control.element(c).unwrap().attribute("id"),
                test.element(t).unwrap().attribute("id")
            );
        }
    }

    #[test]
    fn test_key_beats_earlier_name_match() {
        // Without key rules the first item would pair by position.
        let control = parse_str(r#"<list><item id="A">x</item></list>"#).unwrap();
        let test =
            parse_str(r#"<list><item id="B">x</item><item id="A">y</item></list>"#).unwrap();
        let mut rules = KeyRules::new();
        rules.add("item", "@id").unwrap();

        let pairs = NodeMatcher::with_key_rules(rules).match_children(
            &control,
            list(&control),
            &test,
            list(&test),
        );
        assert_eq!(pairs.len(), 1);
        assert_eq!(test.element(pairs[0].1).unwrap().attribute("id"), Some("A"));
    }

    #[test]
    fn test_text_selector_handles_reordering() {
        let control = parse_str("<l><i>a</i><i>b</i><i>c</i></l>").unwrap();
        let test = parse_str("<l><i>c</i><i>a</i><i>b</i></l>").unwrap();
        let pairs = NodeMatcher::default().match_children(
            &control,
            list(&control),
            &test,
            list(&test),
        );
        assert_eq!(
            texts(&control, pairs.iter().map(|p| p.0)),
            texts(&test, pairs.iter().map(|p| p.1))
        );
    }

    #[test]
    fn test_name_fallback_and_unmatched() {
        let control = parse_str("<l><i>a</i><j>b</j><k/></l>").unwrap();
        let test = parse_str("<l><i>z</i><!-- c --><j>b</j></l>").unwrap();
        let pairs = NodeMatcher::default().match_children(
            &control,
            list(&control),
            &test,
            list(&test),
        );
        let names: Vec<(&str, &str)> = pairs
            .iter()
            .map(|(c, t)| (control.name(*c).unwrap(), test.name(*t).unwrap()))
            .collect();
        // <i> pairs by name only, <k> stays unmatched.
        assert_eq!(names, vec![("i", "i"), ("j", "j")]);
    }

    #[test]
    fn test_search_starts_after_last_match() {
        let control = parse_str("<l><i/><i/></l>").unwrap();
        let test = parse_str("<l><i/><i/></l>").unwrap();
        let pairs = NodeMatcher::default().match_children(
            &control,
            list(&control),
            &test,
            list(&test),
        );
        let c = control.children(list(&control));
        let t = test.children(list(&test));
        assert_eq!(pairs, vec![(c[0], t[0]), (c[1], t[1])]);
    }

    struct Never;

    impl Selector for Never {
        fn can_be_compared(&self, _: NodeHandle<'_>, _: NodeHandle<'_>) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_selector_chain() {
        let control = parse_str("<l><i/></l>").unwrap();
        let test = parse_str("<l><i/></l>").unwrap();
        let matcher = NodeMatcher::new(vec![Box::new(Never)]);
        assert!(matcher
            .match_children(&control, list(&control), &test, list(&test))
            .is_empty());
    }
}
