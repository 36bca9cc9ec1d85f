//! Arena document tree
//!
//! Nodes live in a flat arena and are addressed by [`NodeId`] index handles.
//! Handles are `Copy` and survive any mutation: detaching a node removes it
//! from its parent's child list but keeps the entry alive, so a stale handle
//! can still be inspected without ever dangling. Structural queries
//! (`parent`, `children`) always reflect the current tree.

use std::fmt;

use crate::semdom::dom::{parser, serializer};

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Errors from tree mutation operations
#[derive(Debug, Clone, PartialEq)]
pub enum DomError {
    /// The operation requires the node to be attached to a parent
    DetachedNode,
    /// The content root itself cannot be replaced or detached
    RootMutation,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::DetachedNode => write!(f, "Node is not attached to a parent"),
            DomError::RootMutation => write!(f, "The content root cannot be replaced or detached"),
        }
    }
}

impl std::error::Error for DomError {}

/// Element name and attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub name: String,
    /// Attributes in document order
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The kind of a tree node
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeEntry {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A parsed markup fragment held in an arena.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeEntry>,
    root: NodeId,
}

impl Document {
    /// Create an empty document with a synthetic fragment root.
    pub fn new() -> Self {
        let root_entry = NodeEntry {
            kind: NodeKind::Element(ElementData {
                name: "#root".to_string(),
                attrs: Vec::new(),
            }),
            parent: None,
            children: Vec::new(),
        };
        Document {
            nodes: vec![root_entry],
            root: NodeId(0),
        }
    }

    /// Parse a markup fragment into a document.
    ///
    /// Parsing is lenient and never fails: mismatched close tags are
    /// ignored, unclosed elements are closed at end of input.
    pub fn parse(markup: &str) -> Self {
        parser::parse(markup)
    }

    /// The synthetic fragment root holding all top-level nodes.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The single designated content root of the fragment.
    ///
    /// A fragment wrapped in `html` (and optionally `body`) resolves to the
    /// innermost wrapper, so serializing `<html></html>` yields `""`. A bare
    /// fragment resolves to the synthetic root.
    pub fn content_root(&self) -> NodeId {
        let mut current = self.root;
        if let Some(html) = self.sole_element_child(current, "html") {
            current = html;
            if let Some(body) = self.element_child(current, "body") {
                current = body;
            }
        } else if let Some(body) = self.sole_element_child(current, "body") {
            current = body;
        }
        current
    }

    fn sole_element_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut found = None;
        for &child in self.children(id) {
            match self.kind(child) {
                NodeKind::Element(data) => {
                    if found.is_some() || data.name != name {
                        return None;
                    }
                    found = Some(child);
                }
                NodeKind::Text(text) if text.trim().is_empty() => {}
                NodeKind::Comment(_) => {}
                NodeKind::Text(_) => return None,
            }
        }
        found
    }

    fn element_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| matches!(self.kind(child), NodeKind::Element(data) if data.name == name))
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    /// Element name, or `None` for text and comment nodes.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element(data) => Some(data.name.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element(data) => data.attr(name),
            _ => None,
        }
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element(data) = &mut self.nodes[id.index()].kind {
            match data.attrs.iter_mut().find(|(n, _)| n == name) {
                Some((_, v)) => *v = value.to_string(),
                None => data.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// Create a detached element node.
    pub fn create_element(&mut self, name: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push_entry(NodeKind::Element(ElementData {
            name: name.to_string(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_entry(NodeKind::Text(text.to_string()))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push_entry(NodeKind::Comment(text.to_string()))
    }

    fn push_entry(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeEntry {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[parent.index()].children.push(child);
        self.nodes[child.index()].parent = Some(parent);
    }

    /// Insert `new` as a sibling immediately before `reference`.
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) -> Result<(), DomError> {
        let parent = self.parent(reference).ok_or(DomError::DetachedNode)?;
        self.detach(new);
        let position = self.nodes[parent.index()]
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::DetachedNode)?;
        self.nodes[parent.index()].children.insert(position, new);
        self.nodes[new.index()].parent = Some(parent);
        Ok(())
    }

    /// Remove a node from its parent's child list. The node entry (and its
    /// own subtree) stays alive but becomes unreachable from the root.
    /// Detaching an already-detached node is a no-op.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|&c| c != id);
        }
    }

    /// Remove all children of a node.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for child in children {
            self.nodes[child.index()].parent = None;
        }
    }

    /// Adopt a node (with its subtree) from a foreign document. Returns the
    /// detached copy in this document.
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        let copy = self.push_entry(source.kind(node).clone());
        let children = source.children(node).to_vec();
        for child in children {
            let imported = self.import(source, child);
            self.append_child(copy, imported);
        }
        copy
    }

    /// Serialize the children of a node back to markup text.
    pub fn inner_markup(&self, id: NodeId) -> String {
        serializer::inner_markup(self, id)
    }

    /// Serialize a node including its own tag.
    pub fn outer_markup(&self, id: NodeId) -> String {
        serializer::outer_markup(self, id)
    }

    /// Serialize the whole document: the inner markup of the content root.
    pub fn serialize(&self) -> String {
        self.inner_markup(self.content_root())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
