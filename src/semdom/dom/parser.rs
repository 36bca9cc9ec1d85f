//! Lenient markup fragment parser
//!
//! Builds a [`Document`] from the raw token stream using an open-element
//! stack. Close tags pop to the nearest matching open element and are
//! otherwise ignored; elements left open at end of input are closed
//! implicitly; void elements never take children. Element names are
//! lowercased.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::semdom::dom::document::{Document, NodeId};
use crate::semdom::dom::tokens::{tokenize, MarkupToken};

/// Elements that never have children and take no close tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

static TAG_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^</?([a-zA-Z][a-zA-Z0-9-]*)").expect("tag name pattern is valid")
});

static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ([a-zA-Z_][a-zA-Z0-9_.:-]*)         # attribute name
        (?: \s* = \s*
            (?: "([^"]*)" | '([^']*)' | ([^\s"'>/]+) )
        )?
    "#,
    )
    .expect("attribute pattern is valid")
});

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Decode the handful of entities the serializer can produce.
pub fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Parse a markup fragment into a document. Never fails.
pub fn parse(markup: &str) -> Document {
    let mut doc = Document::new();
    let mut stack: Vec<NodeId> = vec![doc.root()];

    for (token, span) in tokenize(markup) {
        let slice = &markup[span];
        let current = *stack.last().expect("open-element stack never empties");

        match token {
            MarkupToken::OpenTag => {
                let (name, attrs, self_closing) = read_open_tag(slice);
                let element = doc.create_element(&name, attrs);
                doc.append_child(current, element);
                if !self_closing && !is_void_element(&name) {
                    stack.push(element);
                }
            }
            MarkupToken::CloseTag => {
                let name = read_tag_name(slice);
                // Pop to the nearest matching open element; the synthetic
                // root at depth 0 is never popped.
                if let Some(depth) = stack[1..]
                    .iter()
                    .rposition(|&id| doc.element_name(id) == Some(name.as_str()))
                {
                    stack.truncate(depth + 1);
                }
            }
            MarkupToken::Text => {
                let text = doc.create_text(&unescape(slice));
                doc.append_child(current, text);
            }
            MarkupToken::StrayBracket => {
                let text = doc.create_text("<");
                doc.append_child(current, text);
            }
            MarkupToken::Comment => {
                let inner = slice
                    .strip_prefix("<!--")
                    .and_then(|s| s.strip_suffix("-->"))
                    .unwrap_or("");
                let comment = doc.create_comment(inner);
                doc.append_child(current, comment);
            }
            MarkupToken::Doctype => {}
        }
    }

    doc
}

fn read_tag_name(slice: &str) -> String {
    TAG_NAME
        .captures(slice)
        .map(|c| c[1].to_ascii_lowercase())
        .unwrap_or_default()
}

fn read_open_tag(slice: &str) -> (String, Vec<(String, String)>, bool) {
    let name = read_tag_name(slice);
    let self_closing = slice.ends_with("/>");

    // Attributes start after the name and end before the closing bracket.
    let inner_start = 1 + name.len();
    let inner_end = slice.len() - if self_closing { 2 } else { 1 };
    let inner = &slice[inner_start..inner_end];

    let attrs = ATTRIBUTE
        .captures_iter(inner)
        .map(|c| {
            let name = c[1].to_ascii_lowercase();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| unescape(m.as_str()))
                .unwrap_or_default();
            (name, value)
        })
        .collect();

    (name, attrs, self_closing)
}
