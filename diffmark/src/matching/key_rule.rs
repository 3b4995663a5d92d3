//! Key rules: which attribute or child element identifies a record.
//!
//! A key expression is one or more `&&`-joined parts. A part is an attribute
//! (`@id`), or a chain of child element names (`info/code`) that may end in
//! an attribute (`info/@code`). A chain step may carry a 1-based `[n]` index
//! to pick among repeated children (`ref[2]`).
//!
//! A rule can be scoped to a parent tag: `orders>@id` only applies to
//! elements whose parent is `orders`, `!orders>@id` to all others.

use std::collections::HashMap;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::node::{NodeId, XmlDocument};

/// One step of a child chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub name: String,
    /// 1-based index among same-named siblings; `None` picks the first.
    pub index: Option<usize>,
}

/// One `&&`-separated part of a key expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPart {
    pub steps: Vec<ChainStep>,
    pub attribute: Option<String>,
}

impl KeyPart {
    fn parse(part: &str) -> Option<KeyPart> {
        let part = part.trim();
        if part.is_empty() {
            return None;
        }
        let raw: Vec<&str> = part.split('/').map(str::trim).collect();
        let mut steps = Vec::new();
        let mut attribute = None;
        for (i, step) in raw.iter().enumerate() {
            if let Some(attr) = step.strip_prefix('@') {
                if attr.is_empty() || i + 1 != raw.len() {
                    return None;
                }
                attribute = Some(attr.to_string());
                continue;
            }
            if step.is_empty() {
                return None;
            }
            let (name, index) = match step.find('[') {
                None => (*step, None),
                Some(open) => {
                    let digits = step[open + 1..].strip_suffix(']')?;
                    let index: usize = digits.trim().parse().ok()?;
                    if index == 0 {
                        return None;
                    }
                    (&step[..open], Some(index))
                }
            };
            if name.is_empty() {
                return None;
            }
            steps.push(ChainStep {
                name: name.to_string(),
                index,
            });
        }
        Some(KeyPart { steps, attribute })
    }

    /// Extracts this part's value from `node`, or `None` if the attribute or
    /// child chain is absent.
    fn extract(&self, doc: &XmlDocument, node: NodeId) -> Option<String> {
        let mut current = node;
        for step in &self.steps {
            let nth = step.index.unwrap_or(1) - 1;
            current = doc.named_children(current, &step.name).nth(nth)?;
        }
        match &self.attribute {
            Some(attr) => doc
                .element(current)?
                .attribute(attr)
                .map(|v| v.trim().to_string()),
            None => Some(doc.text_content(current)),
        }
    }
}

/// A parsed key expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExpr {
    parts: Vec<KeyPart>,
}

impl KeyExpr {
    /// Parses a key expression; `None` if malformed.
    pub fn parse(expr: &str) -> Option<KeyExpr> {
        let parts = expr
            .split("&&")
            .map(KeyPart::parse)
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() {
            return None;
        }
        Some(KeyExpr { parts })
    }

    /// Returns the key value of `node`. Composite keys join their parts and
    /// have no value unless every part does.
    pub fn extract(&self, doc: &XmlDocument, node: NodeId) -> Option<String> {
        let values = self
            .parts
            .iter()
            .map(|p| p.extract(doc, node))
            .collect::<Option<Vec<_>>>()?;
        Some(values.join("&&"))
    }
}

/// Parent restriction of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentScope {
    pub name: String,
    pub negated: bool,
}

/// A key expression, optionally scoped to a parent tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRule {
    pub scope: Option<ParentScope>,
    pub key: KeyExpr,
}

impl KeyRule {
    /// Parses `[!]parent>key` or `key`.
    pub fn parse(rule: &str) -> Option<KeyRule> {
        let (scope, key) = match rule.split_once('>') {
            Some((parent, key)) => {
                let parent = parent.trim();
                let (name, negated) = match parent.strip_prefix('!') {
                    Some(name) => (name.trim(), true),
                    None => (parent, false),
                };
                if name.is_empty() {
                    return None;
                }
                (
                    Some(ParentScope {
                        name: name.to_string(),
                        negated,
                    }),
                    key,
                )
            }
            None => (None, rule),
        };
        Some(KeyRule {
            scope,
            key: KeyExpr::parse(key)?,
        })
    }

    /// Returns true if this rule applies to an element under `parent_name`.
    pub fn applies_under(&self, parent_name: Option<&str>) -> bool {
        match &self.scope {
            None => true,
            Some(scope) => (parent_name == Some(scope.name.as_str())) != scope.negated,
        }
    }
}

/// Key rules by element tag name, each list checked in order.
#[derive(Debug, Clone, Default)]
pub struct KeyRules {
    rules: FxHashMap<String, Vec<KeyRule>>,
}

impl KeyRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds rules from a `tag -> [rule]` map.
    pub fn from_map(map: &HashMap<String, Vec<String>>) -> Result<Self> {
        let mut rules = KeyRules::new();
        for (tag, values) in map {
            for value in values {
                rules.add(tag, value)?;
            }
        }
        Ok(rules)
    }

    /// Adds a rule for `tag`.
    pub fn add(&mut self, tag: &str, rule: &str) -> Result<()> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(Error::Config("key rule with blank tag name".to_string()));
        }
        let parsed = KeyRule::parse(rule)
            .ok_or_else(|| Error::Config(format!("invalid key rule for <{tag}>: {rule:?}")))?;
        self.rules.entry(tag.to_string()).or_default().push(parsed);
        Ok(())
    }

    /// Returns true if no rules are configured.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the first rule for `tag` that applies under `parent_name`.
    pub fn rule_for(&self, tag: &str, parent_name: Option<&str>) -> Option<&KeyRule> {
        self.rules
            .get(tag)?
            .iter()
            .find(|r| r.applies_under(parent_name))
    }
}
