//! Unit tests for stack configuration loading and selector matching
//!
//! Stack files are the declarative surface of the crate, so these tests
//! exercise the YAML shape users actually write, plus the selector forms
//! plugins configure against them.

use rstest::rstest;
use semdom::semdom::dom::{Document, Selector};
use semdom::semdom::stack::StackConfig;

const STACK_YAML: &str = r#"
label: Content rendering
analyzers:
  - id: element_info
  - id: selector_tag
    config:
      selector: "[data-embed]"
      tag: embed
variants:
  - name: default
    label: Full page
    processors:
      - id: strip_comments
      - id: template
        config:
          selector: "[data-embed]"
          template: "<figure>{inner}</figure>"
  - name: teaser
    processors:
      - id: strip_comments
"#;

fn stack() -> StackConfig {
    serde_yaml::from_str(STACK_YAML).expect("stack yaml should parse")
}

#[test]
fn test_analyzer_order_and_config() {
    let stack = stack();
    let ids: Vec<_> = stack.analyzers().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["element_info", "selector_tag"]);
    assert_eq!(stack.analyzers()[1].config["tag"], "embed");
}

#[rstest(name, expected_processors,
    case("default", vec!["strip_comments", "template"]),
    case("teaser", vec!["strip_comments"]),
)]
fn test_variant_processors(name: &str, expected_processors: Vec<&str>) {
    let variant = stack().variant(name).expect("variant should exist");
    let ids: Vec<_> = variant.processors.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, expected_processors);
}

#[test]
fn test_unknown_variant_is_absent_but_default_synthesized() {
    let bare: StackConfig = serde_yaml::from_str("label: Bare").unwrap();
    assert!(bare.variant("print").is_none());

    let default = bare.variant("default").expect("default always exists");
    assert_eq!(default.label, "Default");
    assert!(default.processors.is_empty());
}

#[test]
fn test_variant_label_defaults_to_empty() {
    assert_eq!(stack().variant("teaser").unwrap().label, "");
}

#[rstest(selector, markup, matches,
    case("div", "<div></div>", true),
    case("span", "<div></div>", false),
    case("*", "<div></div>", true),
    case(".embed", r#"<div class="media embed"></div>"#, true),
    case(".embed", r#"<div class="embedded"></div>"#, false),
    case("#main", r#"<div id="main"></div>"#, true),
    case("[data-kind]", r#"<div data-kind></div>"#, true),
    case("[data-kind=video]", r#"<div data-kind="video"></div>"#, true),
    case("[data-kind=video]", r#"<div data-kind="audio"></div>"#, false),
    case(r#"[data-kind="video clip"]"#, r#"<div data-kind="video clip"></div>"#, true),
    case("div.embed#x", r#"<div id="x" class="embed"></div>"#, true),
    case("div.embed#x", r#"<span id="x" class="embed"></span>"#, false),
)]
fn test_selector_matching(selector: &str, markup: &str, matches: bool) {
    let doc = Document::parse(markup);
    let node = doc.children(doc.root())[0];
    let parsed = Selector::parse(selector).expect("selector should parse");
    assert_eq!(parsed.matches(&doc, node), matches);
}

#[rstest(selector,
    case(""),
    case("div >"),
    case("div span"),
    case("..x"),
    case("[="),
    case("#"),
)]
fn test_invalid_selectors_rejected(selector: &str) {
    assert!(Selector::parse(selector).is_none());
}
