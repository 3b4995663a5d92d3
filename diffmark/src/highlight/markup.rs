//! HTML markers wrapped around highlighted content.

use std::borrow::Cow;

use crate::constants::EXCLUDED_CLASS;
use crate::message::{ResultType, SideMessage};

/// Escapes `<`, `>` and `&` in literal content.
pub fn escape(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::partial_escape(raw)
}

/// Escapes literal text for use inside a quoted HTML attribute.
pub fn escape_attribute(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}

/// The diff a marker came from, rendered as tooltip and anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub order_id: u64,
    pub description: String,
}

/// A status marker attached to a rendered target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub result: ResultType,
    /// `None` for content inside a marked one-sided block. Such content
    /// keeps the class but carries no anchor of its own.
    pub anchor: Option<Anchor>,
}

impl Marker {
    /// Creates the marker for a diff message.
    pub fn from_message(msg: &SideMessage) -> Self {
        Marker {
            result: msg.result,
            anchor: Some(Anchor {
                order_id: msg.order_id,
                description: msg.description.clone(),
            }),
        }
    }

    /// Creates the marker inherited by content inside a one-sided block.
    pub fn inherited(result: ResultType) -> Self {
        Marker {
            result,
            anchor: None,
        }
    }

    /// Returns the marker children of this target inherit, if any.
    pub fn inheritance(&self) -> Option<Marker> {
        self.result
            .is_one_sided()
            .then(|| Marker::inherited(self.result))
    }

    /// The validation status of a row carrying this marker.
    pub fn status(&self) -> ResultType {
        match self.anchor {
            Some(_) => self.result,
            None => ResultType::Hidden,
        }
    }

    /// Attribute list for an HTML tag, with a leading space.
    pub fn attributes(&self) -> String {
        let mut attrs = format!(" class=\"{}\"", self.result);
        if let Some(anchor) = &self.anchor {
            if !anchor.description.is_empty() {
                attrs.push_str(&format!(
                    " title=\"{}\"",
                    escape_attribute(&anchor.description)
                ));
            }
            attrs.push_str(&format!(" data-order-id=\"{}\"", anchor.order_id));
        }
        attrs
    }

    /// Wraps already escaped `html` in a span.
    pub fn wrap(&self, html: &str) -> String {
        format!("<span{}>{html}</span>", self.attributes())
    }
}

/// Wraps already escaped `html` with `marker` if there is one.
pub fn wrap_opt(marker: Option<&Marker>, html: &str) -> String {
    match marker {
        Some(m) => m.wrap(html),
        None => html.to_string(),
    }
}

/// Wraps already escaped `html` in an excluded-block span.
pub fn excluded(html: &str) -> String {
    format!("<span class=\"{EXCLUDED_CLASS}\">{html}</span>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DiffMessage, Side};

    #[test]
    fn test_marker_attributes() {
        let msg = DiffMessage::new(7, "/a", "/a", ResultType::Modified)
            .with_description("was <b> & \"c\"")
            .for_side(Side::Expected)
            .unwrap();
        let marker = Marker::from_message(&msg);
        assert_eq!(
            marker.wrap("x"),
            "<span class=\"MODIFIED\" title=\"was &lt;b&gt; &amp; &quot;c&quot;\" \
             data-order-id=\"7\">x</span>"
        );
        assert_eq!(marker.status(), ResultType::Modified);
        assert!(marker.inheritance().is_none());
    }

    #[test]
    fn test_empty_description_and_inheritance() {
        let msg = DiffMessage::new(2, "/a", "", ResultType::Missed)
            .for_side(Side::Expected)
            .unwrap();
        let marker = Marker::from_message(&msg);
        assert_eq!(
            marker.wrap(""),
            "<span class=\"MISSED\" data-order-id=\"2\"></span>"
        );
        let inner = marker.inheritance().unwrap();
        assert_eq!(inner.wrap("y"), "<span class=\"MISSED\">y</span>");
        assert_eq!(inner.status(), ResultType::Hidden);
    }

    #[test]
    fn test_escape_and_excluded() {
        assert_eq!(escape("a<b>&\"c\""), "a&lt;b&gt;&amp;\"c\"");
        assert_eq!(escape_attribute("\"c\""), "&quot;c&quot;");
        assert_eq!(excluded("z"), "<span class=\"EXCLUDED\">z</span>");
        assert_eq!(wrap_opt(None, "q"), "q");
    }
}
