//! Result accumulator
//!
//! A [`ProcessorResult`] holds the output accumulated over one pass of the
//! walk: a tagged-data mapping plus the reprocess control state. It is an
//! immutable value object; `merge`, `clear` and `reprocess` all return new
//! instances. The two markup-rewriting helpers are the only operations that
//! touch the tree, and they take the document explicitly to make that
//! side effect visible at the call site.

use serde_json::Value;

use crate::semdom::context::SemanticContext;
use crate::semdom::dom::{Document, DomError};
use crate::semdom::tags;

/// Accumulated output of (a subtree of) one document pass.
#[derive(Debug, Clone)]
pub struct ProcessorResult {
    data: Value,
    reprocess: bool,
    resume: Option<SemanticContext>,
}

impl ProcessorResult {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::with_data(tags::empty())
    }

    /// An accumulator seeded with tagged data. Non-mapping values are
    /// replaced with an empty mapping.
    pub fn with_data(data: Value) -> Self {
        let data = if data.is_object() { data } else { tags::empty() };
        ProcessorResult {
            data,
            reprocess: false,
            resume: None,
        }
    }

    /// Dot-path lookup into the accumulated data.
    pub fn get(&self, path: &str) -> Option<&Value> {
        tags::get(&self.data, path)
    }

    /// The full accumulated mapping.
    pub fn to_mapping(&self) -> &Value {
        &self.data
    }

    /// Merge another accumulator's data into this one, returning a new
    /// accumulator. Deep merge recurses into mappings; shallow merge
    /// overwrites top-level keys wholesale. The incoming side wins on leaf
    /// conflicts. Reprocess state of `self` is preserved; the other
    /// accumulator's control state is ignored.
    pub fn merge(&self, other: &ProcessorResult, deep: bool) -> Self {
        self.merge_data(other.to_mapping(), deep)
    }

    /// Merge a raw mapping into the accumulated data.
    pub fn merge_data(&self, incoming: &Value, deep: bool) -> Self {
        let mut data = self.data.clone();
        if deep {
            tags::merge_deep(&mut data, incoming);
        } else {
            tags::merge_shallow(&mut data, incoming);
        }
        ProcessorResult {
            data,
            reprocess: self.reprocess,
            resume: self.resume.clone(),
        }
    }

    /// Return a new accumulator with each given dot-path removed.
    pub fn clear(&self, keys: &[&str]) -> Self {
        let mut data = self.data.clone();
        for key in keys {
            tags::unset(&mut data, key);
        }
        ProcessorResult {
            data,
            reprocess: self.reprocess,
            resume: self.resume.clone(),
        }
    }

    /// Request reprocessing, optionally resuming at a specific context
    /// instead of the one currently being processed. Tagged data is
    /// preserved unchanged.
    pub fn reprocess(&self, resume: Option<SemanticContext>) -> Self {
        ProcessorResult {
            data: self.data.clone(),
            reprocess: true,
            resume,
        }
    }

    /// True after `reprocess` was requested and not yet consumed by a
    /// fresh pass.
    pub fn needs_reprocess(&self) -> bool {
        self.reprocess
    }

    pub fn resume_context(&self) -> Option<&SemanticContext> {
        self.resume.as_ref()
    }

    /// Consume a pending reprocess request: returns the accumulator with
    /// the signal cleared, plus the resume context if one was supplied.
    pub(crate) fn consume_reprocess(self) -> (Self, Option<SemanticContext>) {
        let resume = self.resume;
        (
            ProcessorResult {
                data: self.data,
                reprocess: false,
                resume: None,
            },
            resume,
        )
    }

    /// Replace the context's node with parsed `markup`: the fragment's
    /// top-level nodes are inserted as siblings immediately before the
    /// node, then the node is removed. Returns `reprocess` resuming at the
    /// context's parent, because the original node no longer exists. The
    /// context must not be reused afterwards except via its cached parent.
    pub fn replace_with_markup(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        markup: &str,
    ) -> Result<Self, DomError> {
        if data.is_root() {
            return Err(DomError::RootMutation);
        }
        doc.parent(data.node()).ok_or(DomError::DetachedNode)?;

        let fragment = Document::parse(markup);
        let fragment_root = fragment.content_root();
        for &child in fragment.children(fragment_root) {
            let imported = doc.import(&fragment, child);
            doc.insert_before(imported, data.node())?;
        }
        doc.detach(data.node());

        Ok(self.reprocess(data.parent().cloned()))
    }

    /// Replace the children of the context's node with the parsed children
    /// of `markup`. Does not signal reprocessing; a caller wanting the new
    /// content re-analyzed must request `reprocess` explicitly.
    pub fn set_inner_markup(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        markup: &str,
    ) -> Result<Self, DomError> {
        let fragment = Document::parse(markup);
        let fragment_root = fragment.content_root();

        doc.clear_children(data.node());
        for &child in fragment.children(fragment_root) {
            let imported = doc.import(&fragment, child);
            doc.append_child(data.node(), imported);
        }

        Ok(self.clone())
    }
}

impl Default for ProcessorResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semdom::context::SemanticContext;
    use serde_json::json;

    fn context_over(markup: &str, selector: &str) -> (Document, SemanticContext) {
        let doc = Document::parse(markup);
        let ctx = SemanticContext::chain_to(&doc, selector, tags::empty())
            .expect("selector should match test markup");
        (doc, ctx)
    }

    #[test]
    fn test_merge_deep_right_biased() {
        let a = ProcessorResult::with_data(json!({"k": {"x": 1}, "v": "old"}));
        let b = ProcessorResult::with_data(json!({"k": {"y": 2}, "v": "new"}));
        let merged = a.merge(&b, true);
        assert_eq!(merged.get("k"), Some(&json!({"x": 1, "y": 2})));
        assert_eq!(merged.get("v"), Some(&json!("new")));
        // Inputs untouched
        assert_eq!(a.get("v"), Some(&json!("old")));
    }

    #[test]
    fn test_merge_shallow() {
        let a = ProcessorResult::with_data(json!({"k": {"x": 1}}));
        let b = ProcessorResult::with_data(json!({"k": {"y": 2}}));
        assert_eq!(a.merge(&b, false).get("k"), Some(&json!({"y": 2})));
    }

    #[test]
    fn test_clear() {
        let result = ProcessorResult::with_data(json!({"a": {"b": 1}}));
        let cleared = result.clear(&["a.b"]);
        assert!(!tags::exists(cleared.to_mapping(), "a.b"));
    }

    #[test]
    fn test_reprocess_preserves_data() {
        let result = ProcessorResult::with_data(json!({"kept": true}));
        assert!(!result.needs_reprocess());
        let requested = result.reprocess(None);
        assert!(requested.needs_reprocess());
        assert_eq!(requested.get("kept"), Some(&json!(true)));

        let (consumed, resume) = requested.consume_reprocess();
        assert!(!consumed.needs_reprocess());
        assert!(resume.is_none());
        assert_eq!(consumed.get("kept"), Some(&json!(true)));
    }

    #[test]
    fn test_replace_with_markup() {
        let (mut doc, ctx) = context_over("<div><p id=\"old\">x</p></div>", "#old");
        let result = ProcessorResult::new();
        let replaced = result
            .replace_with_markup(&mut doc, &ctx, "<span>new</span>")
            .unwrap();

        assert_eq!(doc.serialize(), "<div><span>new</span></div>");
        assert!(replaced.needs_reprocess());
        // Resumes at the former parent
        let resume = replaced.resume_context().unwrap();
        assert_eq!(doc.element_name(resume.node()), Some("div"));
    }

    #[test]
    fn test_replace_with_markup_multiple_top_level_nodes() {
        let (mut doc, ctx) = context_over("<div><p id=\"old\">x</p></div>", "#old");
        ProcessorResult::new()
            .replace_with_markup(&mut doc, &ctx, "<b>a</b><i>b</i>")
            .unwrap();
        assert_eq!(doc.serialize(), "<div><b>a</b><i>b</i></div>");
    }

    #[test]
    fn test_replace_root_is_rejected() {
        let mut doc = Document::parse("<div></div>");
        let root = SemanticContext::new(doc.content_root(), tags::empty());
        let err = ProcessorResult::new()
            .replace_with_markup(&mut doc, &root, "<p></p>")
            .unwrap_err();
        assert_eq!(err, DomError::RootMutation);
    }

    #[test]
    fn test_set_inner_markup_no_reprocess() {
        let (mut doc, ctx) = context_over("<div id=\"t\"><p>old</p></div>", "#t");
        let result = ProcessorResult::with_data(json!({"kept": 1}));
        let returned = result.set_inner_markup(&mut doc, &ctx, "<em>new</em>").unwrap();

        assert_eq!(doc.serialize(), "<div id=\"t\"><em>new</em></div>");
        assert!(!returned.needs_reprocess());
        assert_eq!(returned.get("kept"), Some(&json!(1)));
    }
}
