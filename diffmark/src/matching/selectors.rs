//! Built-in selector strategies, strongest first.

use super::key_rule::KeyRules;
use super::{NodeHandle, Selector};
use crate::node::{XmlContent, XmlNodeType};

/// Returns true if both nodes are elements with the same name, or both
/// are text nodes.
fn same_kind_and_name(control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
    match (control.content(), test.content()) {
        (XmlContent::Element(a), XmlContent::Element(b)) => a.qname() == b.qname(),
        (XmlContent::Text(_), XmlContent::Text(_)) => true,
        _ => false,
    }
}

fn same_text(control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
    match (control.content(), test.content()) {
        (XmlContent::Text(a), XmlContent::Text(b)) => a.text().trim() == b.text().trim(),
        _ => false,
    }
}

/// Pairs elements by configured key rules, falling back to a recursive
/// name and text comparison when no key is available on either side.
#[derive(Debug, Clone, Default)]
pub struct ByKeyRuleSelector {
    rules: KeyRules,
}

impl ByKeyRuleSelector {
    /// Creates a selector over `rules`.
    pub fn new(rules: KeyRules) -> Self {
        ByKeyRuleSelector { rules }
    }

    fn equivalent(&self, control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
        let Some(name) = control.name() else {
            return same_text(control, test);
        };
        if test.name() != Some(name) {
            return false;
        }

        let parent_name = control.parent().and_then(|p| p.name());
        if let Some(rule) = self.rules.rule_for(name, parent_name) {
            match (
                rule.key.extract(control.doc, control.id),
                rule.key.extract(test.doc, test.id),
            ) {
                (Some(a), Some(b)) => return a == b,
                (None, None) => {}
                _ => return false,
            }
        }

        let control_children = control.significant_children();
        let test_children = test.significant_children();
        let same_shape = control_children
            .iter()
            .map(|c| c.content().node_type())
            .eq(test_children.iter().map(|t| t.content().node_type()));
        if !same_shape {
            return false;
        }
        control_children
            .into_iter()
            .zip(test_children)
            .all(|(c, t)| match c.content().node_type() {
                XmlNodeType::Element => self.equivalent(c, t),
                _ => same_text(c, t),
            })
    }
}

impl Selector for ByKeyRuleSelector {
    fn can_be_compared(&self, control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
        same_kind_and_name(control, test) && self.equivalent(control, test)
    }
}

/// Pairs elements with the same name and the same full text content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByNameAndTextSelector;

impl Selector for ByNameAndTextSelector {
    fn can_be_compared(&self, control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
        same_kind_and_name(control, test) && control.text_content() == test.text_content()
    }
}

/// Pairs elements with the same name; any two text nodes pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByNameSelector;

impl Selector for ByNameSelector {
    fn can_be_compared(&self, control: NodeHandle<'_>, test: NodeHandle<'_>) -> bool {
        same_kind_and_name(control, test)
    }
}
