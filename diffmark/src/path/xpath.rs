//! XPath subset used by XML diff messages.
//!
//! Supported steps: `name`, `name[n]`, `text()`, `text()[n]`,
//! `comment()[n]` and a final `@attr`. Indexes are 1-based and count
//! same-kind siblings only.

use std::fmt;

/// One location step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XPathStep {
    /// The n-th child element with this name.
    Element { name: String, index: usize },
    /// The n-th text child.
    Text { index: usize },
    /// The n-th comment child.
    Comment { index: usize },
    /// An attribute of the current element.
    Attribute(String),
}

/// A parsed absolute XPath.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XPath {
    steps: Vec<XPathStep>,
}

impl XPath {
    /// Parses an XPath. Returns `None` for anything outside the subset.
    pub fn parse(path: &str) -> Option<XPath> {
        let path = path.trim();
        let body = path.strip_prefix('/').unwrap_or(path);
        let mut steps = Vec::new();
        if body.is_empty() {
            return Some(XPath { steps });
        }

        let raw: Vec<&str> = body.split('/').collect();
        for (i, step) in raw.iter().enumerate() {
            let step = step.trim();
            if step.is_empty() {
                return None;
            }
            if let Some(attr) = step.strip_prefix('@') {
                // Attributes can only terminate a path.
                if attr.is_empty() || i + 1 != raw.len() {
                    return None;
                }
                steps.push(XPathStep::Attribute(attr.to_string()));
                continue;
            }
            let (name, index) = split_predicate(step)?;
            steps.push(match name {
                "text()" => XPathStep::Text { index },
                "comment()" => XPathStep::Comment { index },
                _ if is_name(name) => XPathStep::Element {
                    name: name.to_string(),
                    index,
                },
                _ => return None,
            });
        }
        Some(XPath { steps })
    }

    /// Returns the location steps.
    pub fn steps(&self) -> &[XPathStep] {
        &self.steps
    }

    /// Returns true for the document root (`/`).
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns the path without its last step.
    pub fn parent(&self) -> Option<XPath> {
        if self.steps.is_empty() {
            return None;
        }
        Some(XPath {
            steps: self.steps[..self.steps.len() - 1].to_vec(),
        })
    }

    /// Returns the last step.
    pub fn last(&self) -> Option<&XPathStep> {
        self.steps.last()
    }

    /// Appends a step.
    pub fn push(&mut self, step: XPathStep) {
        self.steps.push(step);
    }
}

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("/");
        }
        for step in &self.steps {
            match step {
                XPathStep::Element { name, index } => write!(f, "/{name}[{index}]")?,
                XPathStep::Text { index } => write!(f, "/text()[{index}]")?,
                XPathStep::Comment { index } => write!(f, "/comment()[{index}]")?,
                XPathStep::Attribute(name) => write!(f, "/@{name}")?,
            }
        }
        Ok(())
    }
}

/// Splits `name[n]` into its name and 1-based index (default 1).
fn split_predicate(step: &str) -> Option<(&str, usize)> {
    match step.find('[') {
        None => Some((step, 1)),
        Some(open) => {
            let rest = step[open + 1..].strip_suffix(']')?;
            let index: usize = rest.trim().parse().ok()?;
            if index == 0 {
                return None;
            }
            Some((&step[..open], index))
        }
    }
}

fn is_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}
