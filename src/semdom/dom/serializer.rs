//! Markup serialization
//!
//! Serializes arena nodes back to markup text. Text nodes and attribute
//! values are entity-escaped so that a parse/serialize round trip is
//! stable; void elements emit no close tag.

use crate::semdom::dom::document::{Document, NodeId, NodeKind};
use crate::semdom::dom::parser::is_void_element;

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for double-quoted serialization.
pub fn escape_attr(value: &str) -> String {
    text_base(value).replace('"', "&quot;")
}

fn text_base(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;")
}

/// Serialize the children of a node.
pub fn inner_markup(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    for &child in doc.children(id) {
        write_node(doc, child, &mut out);
    }
    out
}

/// Serialize a node including its own tag.
pub fn outer_markup(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(data) => {
            out.push('<');
            out.push_str(&data.name);
            for (name, value) in &data.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            out.push('>');
            if is_void_element(&data.name) {
                return;
            }
            for &child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(&data.name);
            out.push('>');
        }
    }
}
