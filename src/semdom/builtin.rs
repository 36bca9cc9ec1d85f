//! Built-in plugins
//!
//! A small set of generally useful analyzers and processors registered by
//! `PluginRegistry::with_defaults`. They double as reference
//! implementations of the capability contracts.

use serde_json::{json, Map, Value};

use crate::semdom::context::{Matcher, SemanticContext};
use crate::semdom::dom::{Document, NodeKind};
use crate::semdom::plugin::{Analysis, DataProcessor, PluginViolation, SemanticAnalyzer};
use crate::semdom::registry::PluginRegistry;
use crate::semdom::result::ProcessorResult;

/// Register all built-in plugins.
pub fn register(registry: &mut PluginRegistry) {
    registry.register_analyzer("element_info", |_config| Box::new(ElementInfoAnalyzer));
    registry.register_analyzer("selector_tag", |config| {
        Box::new(SelectorTagAnalyzer::from_config(config))
    });
    registry.register_processor("strip_comments", |_config| Box::new(StripCommentsProcessor));
    registry.register_processor("collect_links", |_config| Box::new(CollectLinksProcessor));
    registry.register_processor("template", |config| {
        Box::new(TemplateProcessor::from_config(config))
    });
}

/// Tags every element node with `element.name` and `element.attrs`.
pub struct ElementInfoAnalyzer;

impl SemanticAnalyzer for ElementInfoAnalyzer {
    fn analyze(&self, doc: &Document, data: SemanticContext) -> Result<Analysis, PluginViolation> {
        let element = match doc.kind(data.node()) {
            NodeKind::Element(element) => element,
            _ => return Ok(Analysis::Ok(data)),
        };

        let mut attrs = Map::new();
        for (name, value) in &element.attrs {
            attrs.insert(name.clone(), Value::String(value.clone()));
        }
        let info = json!({"name": element.name, "attrs": attrs});
        Ok(Analysis::Ok(data.tag("element", info, false)))
    }
}

/// Tags nodes matching a configured selector.
///
/// Config: `{"selector": "...", "tag": "...", "value": ...}`; `value`
/// defaults to `true`.
pub struct SelectorTagAnalyzer {
    selector: String,
    tag: String,
    value: Value,
}

impl SelectorTagAnalyzer {
    pub fn from_config(config: &Value) -> Self {
        SelectorTagAnalyzer {
            selector: config_str(config, "selector"),
            tag: config_str(config, "tag"),
            value: config
                .get("value")
                .cloned()
                .unwrap_or(Value::Bool(true)),
        }
    }
}

impl SemanticAnalyzer for SelectorTagAnalyzer {
    fn analyze(&self, doc: &Document, data: SemanticContext) -> Result<Analysis, PluginViolation> {
        if self.tag.is_empty() {
            return Err(PluginViolation::new("selector_tag requires a 'tag' setting"));
        }
        if data.matches(doc, Matcher::Selector(&self.selector)) {
            return Ok(Analysis::Ok(data.tag(&self.tag, self.value.clone(), false)));
        }
        Ok(Analysis::Ok(data))
    }
}

/// Removes comment nodes from the tree.
pub struct StripCommentsProcessor;

impl DataProcessor for StripCommentsProcessor {
    fn process(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        result: ProcessorResult,
    ) -> Result<ProcessorResult, PluginViolation> {
        if matches!(doc.kind(data.node()), NodeKind::Comment(_)) {
            doc.detach(data.node());
        }
        Ok(result)
    }
}

/// Accumulates link targets under `links.*`, keyed by target so repeated
/// links collapse.
pub struct CollectLinksProcessor;

impl DataProcessor for CollectLinksProcessor {
    fn process(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        result: ProcessorResult,
    ) -> Result<ProcessorResult, PluginViolation> {
        let href = match doc.element_name(data.node()) {
            Some("a") | Some("area") => doc.attr(data.node(), "href"),
            _ => None,
        };
        let href = match href {
            Some(href) if !href.is_empty() => href.to_string(),
            _ => return Ok(result),
        };

        let mut links = Map::new();
        links.insert(href.clone(), Value::String(href));
        Ok(result.merge_data(&json!({"links": links}), true))
    }
}

/// Rewrites nodes matching a selector through a markup template.
///
/// Config: `{"selector": "...", "template": "..."}`, where `{inner}` in
/// the template is replaced with the node's inner markup. The node itself
/// is replaced via `replace_with_markup`, which triggers reprocessing
/// from its former parent — the rendered template must not match the
/// selector again, or the walk will not terminate.
pub struct TemplateProcessor {
    selector: String,
    template: String,
}

impl TemplateProcessor {
    pub fn from_config(config: &Value) -> Self {
        TemplateProcessor {
            selector: config_str(config, "selector"),
            template: config_str(config, "template"),
        }
    }
}

impl DataProcessor for TemplateProcessor {
    fn process(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        result: ProcessorResult,
    ) -> Result<ProcessorResult, PluginViolation> {
        if self.selector.is_empty() || self.template.is_empty() {
            return Err(PluginViolation::new(
                "template requires 'selector' and 'template' settings",
            ));
        }
        if !data.matches(doc, Matcher::Selector(&self.selector)) {
            return Ok(result);
        }

        let rendered = self.template.replace("{inner}", &data.inner_markup(doc));
        result
            .replace_with_markup(doc, data, &rendered)
            .map_err(|e| PluginViolation::new(format!("template: {e}")))
    }
}

fn config_str(config: &Value, key: &str) -> String {
    config
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semdom::tags;

    fn context_over(markup: &str, selector: &str) -> (Document, SemanticContext) {
        let doc = Document::parse(markup);
        let ctx = SemanticContext::chain_to(&doc, selector, tags::empty())
            .expect("selector should match test markup");
        (doc, ctx)
    }

    #[test]
    fn test_element_info_tags_name_and_attrs() {
        let (doc, ctx) = context_over(r#"<div class="x"></div>"#, "div");
        let analysis = ElementInfoAnalyzer.analyze(&doc, ctx).unwrap();
        match analysis {
            Analysis::Ok(data) => {
                assert_eq!(data.get("element.name"), Some(&json!("div")));
                assert_eq!(data.get("element.attrs.class"), Some(&json!("x")));
            }
            other => panic!("Expected Ok analysis, got {other:?}"),
        }
    }

    #[test]
    fn test_selector_tag_matches() {
        let config = json!({"selector": ".embed", "tag": "embed", "value": {"kind": "video"}});
        let analyzer = SelectorTagAnalyzer::from_config(&config);

        let (doc, ctx) = context_over(r#"<div class="embed"></div>"#, "div");
        match analyzer.analyze(&doc, ctx).unwrap() {
            Analysis::Ok(data) => {
                assert_eq!(data.get("embed.kind"), Some(&json!("video")));
            }
            other => panic!("Expected Ok analysis, got {other:?}"),
        }
    }

    #[test]
    fn test_selector_tag_without_tag_setting_violates() {
        let analyzer = SelectorTagAnalyzer::from_config(&json!({"selector": "div"}));
        let (doc, ctx) = context_over("<div></div>", "div");
        assert!(analyzer.analyze(&doc, ctx).is_err());
    }

    #[test]
    fn test_strip_comments() {
        let mut doc = Document::parse("<div><!-- x --></div>");
        let div = doc.children(doc.root())[0];
        let comment = doc.children(div)[0];
        let root_ctx = SemanticContext::new(doc.content_root(), tags::empty());
        let ctx = root_ctx.push(div).push(comment);

        StripCommentsProcessor
            .process(&mut doc, &ctx, ProcessorResult::new())
            .unwrap();
        assert_eq!(doc.serialize(), "<div></div>");
    }

    #[test]
    fn test_collect_links_dedups() {
        let mut doc = Document::parse(r#"<a href="/x">a</a>"#);
        let ctx = SemanticContext::chain_to(&doc, "a", tags::empty()).unwrap();

        let result = CollectLinksProcessor
            .process(&mut doc, &ctx, ProcessorResult::new())
            .unwrap();
        let result = CollectLinksProcessor
            .process(&mut doc, &ctx, result)
            .unwrap();
        assert_eq!(result.get("links"), Some(&json!({"/x": "/x"})));
    }

    #[test]
    fn test_template_replaces_and_reprocesses() {
        let config = json!({
            "selector": "[data-embed]",
            "template": "<figure>{inner}</figure>",
        });
        let processor = TemplateProcessor::from_config(&config);
        let (mut doc, ctx) = context_over("<div><p data-embed=\"1\">x</p></div>", "p");

        let result = processor
            .process(&mut doc, &ctx, ProcessorResult::new())
            .unwrap();
        assert_eq!(doc.serialize(), "<div><figure>x</figure></div>");
        assert!(result.needs_reprocess());
    }

    #[test]
    fn test_template_ignores_non_matching() {
        let processor =
            TemplateProcessor::from_config(&json!({"selector": ".none", "template": "<b></b>"}));
        let (mut doc, ctx) = context_over("<div></div>", "div");
        let result = processor
            .process(&mut doc, &ctx, ProcessorResult::new())
            .unwrap();
        assert!(!result.needs_reprocess());
        assert_eq!(doc.serialize(), "<div></div>");
    }
}
