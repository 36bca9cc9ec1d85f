//! Structural selector matching
//!
//! A compound simple selector matched against a single node: optional type
//! name (or `*`), then any number of `#id`, `.class`, `[attr]` and
//! `[attr=value]` parts. This is the self-axis predicate contexts use for
//! structural matching; there are no combinators. Invalid selector text
//! parses to `None` and therefore never matches and never errors.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::semdom::dom::document::{Document, NodeId};

static TYPE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*|[a-zA-Z][a-zA-Z0-9-]*)").expect("type pattern is valid"));

static SIMPLE_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:#([-\w]+)|\.([-\w]+)|\[\s*([a-zA-Z_][\w.:-]*)\s*(?:=\s*(?:"([^"]*)"|'([^']*)'|([^\]\s'"]+))\s*)?\])"#,
    )
    .expect("simple-part pattern is valid")
});

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Parse selector text. Returns `None` for anything that is not a
    /// single compound simple selector.
    pub fn parse(input: &str) -> Option<Selector> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        let mut selector = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        };
        let mut cursor = 0;

        if let Some(m) = TYPE_PART.find(input) {
            if m.as_str() != "*" {
                selector.tag = Some(m.as_str().to_ascii_lowercase());
            }
            cursor = m.end();
        }

        while cursor < input.len() {
            let captures = SIMPLE_PART.captures(&input[cursor..])?;
            let full = captures.get(0).expect("capture 0 always present");
            if let Some(id) = captures.get(1) {
                selector.id = Some(id.as_str().to_string());
            } else if let Some(class) = captures.get(2) {
                selector.classes.push(class.as_str().to_string());
            } else if let Some(attr) = captures.get(3) {
                let value = captures
                    .get(4)
                    .or_else(|| captures.get(5))
                    .or_else(|| captures.get(6))
                    .map(|m| m.as_str().to_string());
                selector.attrs.push((attr.as_str().to_ascii_lowercase(), value));
            }
            cursor += full.end();
        }

        Some(selector)
    }

    /// Whether this selector matches the given node.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let name = match doc.element_name(node) {
            Some(name) => name,
            None => return false,
        };

        if let Some(tag) = &self.tag {
            if tag != name {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }

        for class in &self.classes {
            let found = doc
                .attr(node, "class")
                .map(|value| value.split_whitespace().any(|c| c == class))
                .unwrap_or(false);
            if !found {
                return false;
            }
        }

        for (attr, expected) in &self.attrs {
            match (doc.attr(node, attr), expected) {
                (None, _) => return false,
                (Some(actual), Some(expected)) if actual != expected => return false,
                _ => {}
            }
        }

        true
    }
}
