//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use zistruct::{
    validate, validate_collect, validate_with, ZiError, ZiFnCommand, ZiList, ZiMap, ZiNode,
    ZiStructConfig,
};

fn check(data: Value, spec: Value) -> Result<Value, String> {
    validate(&ZiNode::from(data), &ZiNode::from(spec))
        .map(|n| n.to_value())
        .map_err(|e| e.to_string())
}

#[test]
fn test_defaults_as_types() {
    assert_eq!(check(json!({"a": 2}), json!({"a": 1})), Ok(json!({"a": 2})));
    assert_eq!(check(json!({}), json!({"a": 1})), Ok(json!({"a": 1})));
    assert_eq!(
        check(json!({"a": "x"}), json!({"a": 1})),
        Err("Invalid data: Expected field a to be number, but found string: x.".to_string())
    );
}

#[test]
fn test_open_and_closed_objects() {
    assert_eq!(check(json!({"a": 1, "b": 2}), json!({})), Ok(json!({"a": 1, "b": 2})));
    assert_eq!(
        check(json!({"a": 1, "b": 2}), json!({"a": 1})),
        Err("Invalid data: Unexpected keys at field <root>: b".to_string())
    );
    assert_eq!(
        check(json!({"a": 1, "b": 2}), json!({"a": 1, "`$OPEN`": true})),
        Ok(json!({"a": 1, "b": 2}))
    );
}

#[test]
fn test_nested_shapes() {
    assert_eq!(
        check(json!({"p": {"q": true}}), json!({"p": {"q": false, "r": "d"}})),
        Ok(json!({"p": {"q": true, "r": "d"}}))
    );
    assert_eq!(
        check(json!({"p": [1]}), json!({"p": {}})),
        Err("Invalid data: Expected field p to be object, but found array: [1].".to_string())
    );
}

#[test]
fn test_type_validators() {
    let data = json!({"s": "x", "n": 1, "b": true, "o": {"k": 1}, "l": [1], "any": null});
    let spec = json!({
        "s": "`$STRING`",
        "n": "`$NUMBER`",
        "b": "`$BOOLEAN`",
        "o": "`$OBJECT`",
        "l": "`$ARRAY`",
        "any": "`$ANY`"
    });
    assert_eq!(check(data.clone(), spec), Ok(data));
}

#[test]
fn test_required_values() {
    assert_eq!(
        check(json!({}), json!({"s": "`$STRING`"})),
        Err("Invalid data: Expected field s to be string, but found no value.".to_string())
    );
    assert_eq!(
        check(json!({"s": ""}), json!({"s": "`$STRING`"})),
        Err("Invalid data: Empty string at s".to_string())
    );
    assert_eq!(
        check(json!({"n": "1"}), json!({"n": "`$NUMBER`"})),
        Err("Invalid data: Expected field n to be number, but found string: 1.".to_string())
    );
}

#[test]
fn test_one_alternation() {
    let spec = json!(["`$ONE`", "`$STRING`", "`$NUMBER`"]);
    assert_eq!(check(json!(5), spec.clone()), Ok(json!(5)));
    assert_eq!(check(json!("s"), spec.clone()), Ok(json!("s")));
    assert_eq!(
        check(json!(true), spec),
        Err("Invalid data: Expected one of string, number, but found boolean: true.".to_string())
    );
}

#[test]
fn test_one_inside_map() {
    let spec = json!({"x": ["`$ONE`", "`$NUMBER`", {"k": "`$STRING`"}]});
    assert_eq!(check(json!({"x": {"k": "v"}}), spec.clone()), Ok(json!({"x": {"k": "v"}})));
    assert_eq!(
        check(json!({"x": "a"}), spec),
        Err("Invalid data: Expected field x to be one of number, {k:string}, but found string: a."
            .to_string())
    );
}

#[test]
fn test_one_must_come_first() {
    let err = check(json!({"x": 1}), json!({"x": [1, "`$ONE`"]})).unwrap_err();
    assert!(err.contains("must be the first element of an array"), "{err}");
}

#[test]
fn test_exact() {
    let spec = json!({"c": ["`$EXACT`", "red", "green"]});
    assert_eq!(check(json!({"c": "red"}), spec.clone()), Ok(json!({"c": "red"})));
    assert_eq!(
        check(json!({"c": "blue"}), spec),
        Err("Invalid data: Expected field c to be exactly equal to one of red, green, but found string: blue."
            .to_string())
    );
    assert_eq!(
        check(json!({"c": {"a": 1}}), json!({"c": ["`$EXACT`", {"a": 1}]})),
        Ok(json!({"c": {"a": 1}}))
    );
}

#[test]
fn test_child_map_form() {
    let spec = json!({"a": {"`$CHILD`": "`$NUMBER`"}});
    assert_eq!(check(json!({"a": {"x": 1, "y": 2}}), spec.clone()), Ok(json!({"a": {"x": 1, "y": 2}})));
    assert_eq!(check(json!({}), spec.clone()), Ok(json!({"a": {}})));
    assert_eq!(
        check(json!({"a": {"x": 1, "y": "no"}}), spec.clone()),
        Err("Invalid data: Expected field a.y to be number, but found string: no. | \
             Unexpected keys at field a: y"
            .to_string())
    );
    assert_eq!(
        check(json!({"a": 3}), spec),
        Err("Invalid data: Expected field a to be object, but found number: 3.".to_string())
    );
}

#[test]
fn test_child_list_form() {
    let spec = json!({"l": ["`$CHILD`", "`$NUMBER`"]});
    assert_eq!(check(json!({"l": [1, 2]}), spec.clone()), Ok(json!({"l": [1, 2]})));
    assert_eq!(check(json!({}), spec.clone()), Ok(json!({"l": []})));
    assert_eq!(
        check(json!({"l": [1, "x"]}), spec.clone()),
        Err("Invalid data: Expected field l.1 to be number, but found string: x.".to_string())
    );
    assert_eq!(
        check(json!({"l": "x"}), spec),
        Err("Invalid data: Expected field l to be array, but found string: x.".to_string())
    );
}

#[test]
fn test_child_list_of_shapes() {
    let spec = json!({"l": ["`$CHILD`", {"id": "`$NUMBER`", "tag": "none"}]});
    assert_eq!(
        check(json!({"l": [{"id": 1}, {"id": 2, "tag": "t"}]}), spec),
        Ok(json!({"l": [{"id": 1, "tag": "none"}, {"id": 2, "tag": "t"}]}))
    );
}

#[test]
fn test_transform_commands_are_off() {
    assert_eq!(check(json!({"a": 1}), json!({"a": 1, "b": "`$COPY`"})), Ok(json!({"a": 1})));
}

#[test]
fn test_collect_into_sink() {
    let errs = ZiList::new();
    let out = validate_collect(
        Some(ZiNode::from(json!({"a": "x", "b": "y"}))),
        &ZiNode::from(json!({"a": 1, "b": 2})),
        None,
        &errs,
        &ZiStructConfig::default(),
    );
    assert_eq!(out.unwrap().to_value(), json!({"a": 1, "b": 2}));
    assert_eq!(errs.len(), 2);
}

#[test]
fn test_extra_validator() {
    let extra = ZiMap::new();
    extra.insert(
        "$EVEN",
        ZiFnCommand::node("$EVEN", |inj, _, _| {
            let out = inj.current();
            let even = out
                .as_ref()
                .and_then(|v| v.to_value().as_i64())
                .map_or(false, |n| n % 2 == 0);
            if !even {
                inj.push_err(format!("Not even at {}", inj.key));
                return None;
            }
            out
        }),
    );
    let extra = ZiNode::Map(extra);
    let spec = ZiNode::from(json!({"n": "`$EVEN`"}));
    let config = ZiStructConfig::default();

    let ok = validate_with(&ZiNode::from(json!({"n": 4})), &spec, Some(&extra), &config).unwrap();
    assert_eq!(ok.to_value(), json!({"n": 4}));

    let err = validate_with(&ZiNode::from(json!({"n": 3})), &spec, Some(&extra), &config);
    assert!(matches!(err, Err(ZiError::Validation { .. })));
}

#[test]
fn test_separator_and_value_length() {
    let config = ZiStructConfig::builder()
        .separator("; ")
        .value_maxlen(6)
        .build();
    let err = validate_with(
        &ZiNode::from(json!({"a": "abcdefghij", "b": "y"})),
        &ZiNode::from(json!({"a": 1, "b": 2})),
        None,
        &config,
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid data: Expected field a to be number, but found string: abc....; \
         Expected field b to be number, but found string: y."
    );
}

#[test]
fn test_child_list_reports_each_bad_slot() {
    let spec = json!({"l": ["`$CHILD`", "`$NUMBER`"]});
    assert_eq!(
        check(json!({"l": ["x", "y", 1]}), spec),
        Err("Invalid data: Expected field l.0 to be number, but found string: x. \
             | Expected field l.1 to be number, but found string: y."
            .to_string())
    );
}

#[test]
fn test_literal_helpers_are_off() {
    assert_eq!(check(json!({}), json!({"t": "`$WHEN`", "b": "`$BT`"})), Ok(json!({})));
}
