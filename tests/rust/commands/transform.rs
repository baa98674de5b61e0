//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use zistruct::{transform, transform_with, ZiNode, ZiStructConfig};

fn run(data: Value, spec: Value) -> Value {
    transform(&ZiNode::from(data), &ZiNode::from(spec), None)
        .map(|n| n.to_value())
        .unwrap_or(Value::Null)
}

#[test]
fn test_transform_identity_without_commands() {
    let data = json!({"a": 1, "b": [true, null, "x"], "c": {"d": 1.5}});
    assert_eq!(run(data.clone(), data.clone()), data);
}

#[test]
fn test_transform_leaves_inputs_untouched() {
    let data = ZiNode::from(json!({"items": [1, 2]}));
    let spec = ZiNode::from(json!({"x": ["`$EACH`", "items", "`$COPY`"], "`$MERGE`": ""}));
    let before = (data.to_value(), spec.to_value());
    transform(&data, &spec, None);
    assert_eq!((data.to_value(), spec.to_value()), before);
}

#[test]
fn test_copy() {
    assert_eq!(
        run(json!({"a": 1, "b": {"c": 2}}), json!({"a": "`$COPY`", "b": {"c": "`$COPY`"}, "z": "`$COPY`"})),
        json!({"a": 1, "b": {"c": 2}})
    );
}

#[test]
fn test_delete() {
    assert_eq!(run(json!({}), json!({"a": "`$DELETE`", "b": 1})), json!({"b": 1}));
    assert_eq!(
        run(json!({}), json!({"x": ["a", "`$DELETE`", "b", "`$DELETE`", "c"]})),
        json!({"x": ["a", "b", "c"]})
    );
}

#[test]
fn test_key_falls_back_to_own_key() {
    assert_eq!(run(json!({}), json!({"a": {"k": "`$KEY`"}})), json!({"a": {"k": "a"}}));
}

#[test]
fn test_key_marker_wins() {
    assert_eq!(
        run(json!({"a": {"id": "x1"}}), json!({"a": {"`$KEY`": "id", "k": "`$KEY`"}})),
        json!({"a": {"k": "x1"}})
    );
}

#[test]
fn test_key_from_meta() {
    assert_eq!(
        run(json!({}), json!({"a": {"`$META`": {"KEY": "m"}, "k": "`$KEY`"}})),
        json!({"a": {"k": "m"}})
    );
}

#[test]
fn test_merge_single_argument() {
    assert_eq!(
        run(json!({"a": {"x": 1, "y": 2}}), json!({"b": {"`$MERGE`": "`a`", "y": 3}})),
        json!({"b": {"x": 1, "y": 3}})
    );
}

#[test]
fn test_merge_list_of_arguments() {
    assert_eq!(
        run(
            json!({"a": {"x": 1}, "b": {"y": 2}}),
            json!({"c": {"`$MERGE`": ["`a`", "`b`"], "z": 0}})
        ),
        json!({"c": {"x": 1, "y": 2, "z": 0}})
    );
}

#[test]
fn test_merge_empty_means_whole_data() {
    assert_eq!(
        run(json!({"a": 1, "z": 9}), json!({"`$MERGE`": "", "z": 0})),
        json!({"a": 1, "z": 0})
    );
}

#[test]
fn test_merge_suffixes_order_commands() {
    assert_eq!(
        run(
            json!({"a": {"x": 1}, "b": {"y": 3}}),
            json!({"`$MERGE1`": "`a`", "`$MERGE2`": "`b`", "z": 0})
        ),
        json!({"x": 1, "y": 3, "z": 0})
    );
}

#[test]
fn test_each_over_list() {
    assert_eq!(
        run(
            json!({"items": [{"v": 10}, {"v": 20}]}),
            json!({"x": ["`$EACH`", "items", {"v": "`$COPY`"}]})
        ),
        json!({"x": [{"v": 10}, {"v": 20}]})
    );
}

#[test]
fn test_each_with_extra_data() {
    let out = transform(
        &ZiNode::from(json!({})),
        &ZiNode::from(json!({"x": ["`$EACH`", "$DATA.items", "`$COPY`"]})),
        Some(&ZiNode::from(json!({"items": [10, 20]}))),
    )
    .unwrap();
    assert_eq!(out.to_value(), json!({"x": [10, 20]}));
}

#[test]
fn test_each_over_map_tags_keys() {
    assert_eq!(
        run(
            json!({"m": {"a": {"n": 1}, "b": {"n": 2}}}),
            json!({"x": ["`$EACH`", "m", {"n": "`$COPY`", "k": "`$KEY`"}]})
        ),
        json!({"x": [{"k": "a", "n": 1}, {"k": "b", "n": 2}]})
    );
}

#[test]
fn test_each_missing_source_is_empty() {
    assert_eq!(
        run(json!({}), json!({"x": ["`$EACH`", "items", {"v": "`$COPY`"}]})),
        json!({"x": []})
    );
}

#[test]
fn test_pack_by_key_field() {
    assert_eq!(
        run(
            json!({"items": [{"id": "a", "v": 1}, {"id": "b", "v": 2}]}),
            json!({"x": {"`$PACK`": ["items", {"`$KEY`": "id", "v": "`$COPY`"}]}})
        ),
        json!({"x": {"a": {"v": 1}, "b": {"v": 2}}})
    );
}

#[test]
fn test_pack_over_map_uses_source_keys() {
    assert_eq!(
        run(
            json!({"m": {"p": {"n": 1}, "q": {"n": 2}}}),
            json!({"x": {"`$PACK`": ["m", {"n": "`$COPY`", "k": "`$KEY`"}]}})
        ),
        json!({"x": {"p": {"k": "p", "n": 1}, "q": {"k": "q", "n": 2}}})
    );
}

#[test]
fn test_ref_recurses_while_data_lasts() {
    assert_eq!(
        run(
            json!({"a": {"x": 1, "c": {"x": 2, "c": {"x": 3}}}}),
            json!({"a": {"x": "`$COPY`", "c": ["`$REF`", "a"]}})
        ),
        json!({"a": {"x": 1, "c": {"x": 2, "c": {"x": 3}}}})
    );
}

#[test]
fn test_literal_helpers() {
    assert_eq!(
        run(json!({}), json!({"a": "`$BT`", "b": "`$DS`", "c": "x`$BT`y"})),
        json!({"a": "`", "b": "$", "c": "x`y"})
    );
    let when = run(json!({}), json!({"t": "`$WHEN`"}));
    assert!(when["t"].as_str().unwrap().contains('T'));
}

#[test]
fn test_custom_base() {
    let config = ZiStructConfig::builder().base("data").build();
    let out = transform_with(
        Some(&ZiNode::from(json!({"a": 1}))),
        &ZiNode::from(json!({"a": "`$COPY`", "x": "`a`"})),
        None,
        None,
        &config,
    )
    .unwrap();
    assert_eq!(out.to_value(), json!({"a": 1, "x": 1}));
}

#[test]
fn test_key_from_recorded_meta() {
    let spec = json!({"p": {"`$META`": {"KEY": "k"}, "z$": "`$KEY`"}});
    assert_eq!(run(json!({}), spec), json!({"p": {"z$": "k"}}));
}

#[test]
fn test_unused_key_marker_is_dropped() {
    assert_eq!(run(json!({}), json!({"p": {"`$KEY`": "id", "q": 1}})), json!({"p": {"q": 1}}));
}

#[test]
fn test_each_sees_meta_recorded_outside() {
    let spec = json!({
        "a": {"`$META`": {"KEY": "m"}},
        "y": "`$META:a.KEY$`",
        "x": ["`$EACH`", "items", "`$META:a.KEY$`"]
    });
    assert_eq!(
        run(json!({"m": 5, "items": [1]}), spec),
        json!({"a": {}, "x": [5], "y": 5})
    );
}

#[test]
fn test_copy_of_missing_list_items() {
    let spec = json!({"l": ["`$EACH`", "items", {"v": "`$COPY`"}]});
    assert_eq!(
        run(json!({"items": [{}, {"v": 2}]}), spec),
        json!({"l": [{}, {"v": 2}]})
    );
}
