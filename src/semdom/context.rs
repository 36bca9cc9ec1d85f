//! Node context with inherited tagged data
//!
//! A [`SemanticContext`] binds one tree node to a snapshot of tagged data
//! and a chain of parent contexts. It is immutable: every mutating
//! operation returns a new context, so analyzers can thread refinements
//! forward without affecting anything already recorded elsewhere. The node
//! is held as an arena handle only; a context never assumes its node is
//! still attached to the tree, and its cached parent is a planned resume
//! point, not proof of current tree membership.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::semdom::dom::{Document, NodeId, Selector};
use crate::semdom::tags;

/// A candidate for [`SemanticContext::matches`].
#[derive(Debug, Clone, Copy)]
pub enum Matcher<'a> {
    /// Same node identity
    Node(NodeId),
    /// Structural selector matched against the node itself
    Selector(&'a str),
    /// Another context over the same node
    Context(&'a SemanticContext),
}

/// A position in the tree plus inherited tagged data.
#[derive(Debug, Clone)]
pub struct SemanticContext {
    node: NodeId,
    data: Rc<Value>,
    parent: Option<Rc<SemanticContext>>,
}

impl SemanticContext {
    /// Create a root context over a node with seed tagged data.
    ///
    /// Non-mapping seed values are replaced with an empty mapping.
    pub fn new(node: NodeId, data: Value) -> Self {
        let data = if data.is_object() { data } else { tags::empty() };
        SemanticContext {
            node,
            data: Rc::new(data),
            parent: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn parent(&self) -> Option<&SemanticContext> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The full tagged-data mapping.
    pub fn to_mapping(&self) -> &Value {
        &self.data
    }

    /// Dot-path lookup; `None` means absent (a present `null` is
    /// `Some(&Value::Null)`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        tags::get(&self.data, path)
    }

    /// Whether a dot-path exists, even with a `null` value.
    pub fn has(&self, path: &str) -> bool {
        tags::exists(&self.data, path)
    }

    /// Return a new context with `name` tagged to `value`.
    ///
    /// With `deep_merge`, a mapping value merges recursively into an
    /// existing mapping under the same name; otherwise the value replaces
    /// the old one outright.
    pub fn tag(&self, name: &str, value: Value, deep_merge: bool) -> Self {
        let mut data = (*self.data).clone();
        if deep_merge {
            let mut wrapper = Map::new();
            wrapper.insert(name.to_string(), value);
            tags::merge_deep(&mut data, &Value::Object(wrapper));
        } else {
            tags::set(&mut data, name, value);
        }
        SemanticContext {
            node: self.node,
            data: Rc::new(data),
            parent: self.parent.clone(),
        }
    }

    /// Return a new context with each given dot-path removed. Missing paths
    /// are ignored.
    pub fn clear(&self, keys: &[&str]) -> Self {
        let mut data = (*self.data).clone();
        for key in keys {
            tags::unset(&mut data, key);
        }
        SemanticContext {
            node: self.node,
            data: Rc::new(data),
            parent: self.parent.clone(),
        }
    }

    /// Return a new context over `child`, inheriting the tagged data
    /// unchanged, with this context as its parent.
    pub fn push(&self, child: NodeId) -> Self {
        SemanticContext {
            node: child,
            data: Rc::clone(&self.data),
            parent: Some(Rc::new(self.clone())),
        }
    }

    /// Whether this context's node matches the candidate. Never errors:
    /// invalid selector text simply does not match.
    pub fn matches(&self, doc: &Document, candidate: Matcher<'_>) -> bool {
        match candidate {
            Matcher::Node(id) => self.node == id,
            Matcher::Context(other) => self.node == other.node,
            Matcher::Selector(text) => Selector::parse(text)
                .map(|selector| selector.matches(doc, self.node))
                .unwrap_or(false),
        }
    }

    /// Serialization of the node's children only.
    pub fn inner_markup(&self, doc: &Document) -> String {
        doc.inner_markup(self.node)
    }

    /// Build the context chain from the content root down to the first node
    /// matching `selector`, seeding every context with `data`.
    ///
    /// Test and plugin support; returns `None` when nothing matches.
    pub fn chain_to(doc: &Document, selector: &str, data: Value) -> Option<SemanticContext> {
        let selector = Selector::parse(selector)?;
        let root = doc.content_root();
        let path = find_path(doc, root, &selector)?;

        let mut current = SemanticContext::new(root, data);
        for node in path {
            current = current.push(node);
        }
        Some(current)
    }
}

/// Depth-first search for the first match, returning the node path below
/// `from` (exclusive) down to the match (inclusive).
fn find_path(doc: &Document, from: NodeId, selector: &Selector) -> Option<Vec<NodeId>> {
    if selector.matches(doc, from) {
        return Some(Vec::new());
    }
    for &child in doc.children(from) {
        if let Some(mut path) = find_path(doc, child, selector) {
            path.insert(0, child);
            return Some(path);
        }
    }
    None
}
