//! Property-based tests for tagged-data merging and the markup
//! parse/serialize cycle
//!
//! These tests ensure that deep merge behaves like a right-biased lattice
//! operation on mappings, and that parsing is total: any input produces a
//! document, and serialized output is a fixed point of the parse cycle.

use proptest::prelude::*;
use serde_json::{json, Value};

use semdom::semdom::dom::{Document, Selector};
use semdom::semdom::tags;

/// Generate scalar leaf values
fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

/// Generate nested tagged-data mappings
fn mapping_strategy() -> impl Strategy<Value = Value> {
    let value = leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,3}", inner, 0..4)
            .prop_map(|entries| Value::Object(entries.into_iter().collect()))
    });
    prop::collection::btree_map("[a-z]{1,3}", value, 0..5)
        .prop_map(|entries| Value::Object(entries.into_iter().collect()))
}

/// Generate well-formed markup fragments
fn markup_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        // Text, including characters the serializer escapes
        "[a-zA-Z0-9 .,!&]{1,12}",
        // A void element
        Just("<br>".to_string()),
        // Comments
        "[a-zA-Z0-9 ]{0,8}".prop_map(|t| format!("<!--{t}-->")),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        (
            prop::sample::select(vec!["div", "span", "em", "section"]),
            proptest::option::of("[a-z]{1,6}"),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(name, class, children)| {
                let attrs = class
                    .map(|c| format!(" class=\"{c}\""))
                    .unwrap_or_default();
                format!("<{name}{attrs}>{}</{name}>", children.concat())
            })
    })
}

proptest! {
    #[test]
    fn test_merge_deep_empty_is_identity(a in mapping_strategy()) {
        let mut left = a.clone();
        tags::merge_deep(&mut left, &tags::empty());
        prop_assert_eq!(&left, &a);

        let mut empty = tags::empty();
        tags::merge_deep(&mut empty, &a);
        prop_assert_eq!(&empty, &a);
    }

    #[test]
    fn test_merge_deep_idempotent(a in mapping_strategy()) {
        let mut merged = a.clone();
        tags::merge_deep(&mut merged, &a);
        prop_assert_eq!(&merged, &a);
    }

    #[test]
    fn test_merge_deep_right_biased_union(a in mapping_strategy(), b in mapping_strategy()) {
        let mut merged = a.clone();
        tags::merge_deep(&mut merged, &b);
        let merged_map = merged.as_object().unwrap();

        // Key union: nothing from either side disappears
        for key in a.as_object().unwrap().keys() {
            prop_assert!(merged_map.contains_key(key));
        }
        for (key, value) in b.as_object().unwrap() {
            prop_assert!(merged_map.contains_key(key));
            // Unless both sides hold mappings, the incoming side wins
            let both_mappings =
                value.is_object() && a.get(key).map(Value::is_object).unwrap_or(false);
            if !both_mappings {
                prop_assert_eq!(&merged_map[key], value);
            }
        }
    }

    #[test]
    fn test_set_then_get_round_trips(key in "[a-z]{1,6}", value in leaf_strategy()) {
        let mut data = tags::empty();
        tags::set(&mut data, &key, value.clone());
        prop_assert_eq!(tags::get(&data, &key), Some(&value));
        prop_assert!(tags::exists(&data, &key));
    }

    #[test]
    fn test_parse_never_panics(input in "\\PC{0,64}") {
        let _doc = Document::parse(&input);
    }

    #[test]
    fn test_selector_parse_never_panics(input in "\\PC{0,24}") {
        let _selector = Selector::parse(&input);
    }

    #[test]
    fn test_serialized_output_is_a_parse_fixed_point(input in markup_strategy()) {
        let once = Document::parse(&input).serialize();
        let twice = Document::parse(&once).serialize();
        prop_assert_eq!(once, twice);
    }
}
