//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.

use pretty_assertions::assert_eq;
use serde_json::json;
use zistruct::{get_path, get_path_from, transform, ZiNode, ZiPath};

fn node(value: serde_json::Value) -> ZiNode {
    ZiNode::from(value)
}

#[test]
fn test_get_path_absolute() {
    let store = node(json!({"a": {"b": [5, {"c": "x"}]}}));
    assert_eq!(get_path("a.b.0", &store), Some(ZiNode::from(5)));
    assert_eq!(get_path("a.b.1.c", &store), Some(ZiNode::from("x")));
    assert_eq!(get_path(vec!["a", "b", "1", "c"], &store), Some(ZiNode::from("x")));
    assert_eq!(get_path("a.zz.c", &store), None);
    assert_eq!(get_path("a.b.0.c", &store), None);
}

#[test]
fn test_get_path_empty_is_store() {
    let store = node(json!({"a": 1}));
    assert_eq!(get_path("", &store), Some(store.clone()));
    assert_eq!(get_path(Vec::<String>::new(), &store), Some(store.clone()));
}

#[test]
fn test_get_path_relative_to_current() {
    let store = node(json!({"a": 1}));
    let current = node(json!({"x": {"y": 2}}));
    assert_eq!(get_path_from(".x.y", &store, Some(&current)), Some(ZiNode::from(2)));
    assert_eq!(get_path_from(".", &store, Some(&current)), Some(current.clone()));
    assert_eq!(get_path_from("..x", &store, Some(&current)), None);
}

#[test]
fn test_path_parse_and_display() {
    let path = ZiPath::parse("a.$GET:b.c$.d");
    assert_eq!(path.segments(), &["a", "$GET:b.c$", "d"]);
    assert_eq!(path.to_string(), "a.$GET:b.c$.d");
    assert!(ZiPath::parse(".a").is_relative());
    assert!(!ZiPath::parse("a").is_relative());
}

#[test]
fn test_relative_paths_in_templates() {
    let data = node(json!({"a": {"k": 7, "b": {"c": 1}}}));
    let spec = node(json!({"a": {"b": {"x": "`.c`", "y": "`..k`"}}}));
    let out = transform(&data, &spec, None).unwrap();
    assert_eq!(out.to_value(), json!({"a": {"b": {"x": 1, "y": 7}}}));
}

#[test]
fn test_dynamic_get_segment() {
    let data = node(json!({"sel": "y", "m": {"x": 1, "y": 3}}));
    let spec = node(json!({"v": "`m.$GET:sel$`"}));
    let out = transform(&data, &spec, None).unwrap();
    assert_eq!(out.to_value(), json!({"v": 3}));
}

#[test]
fn test_dynamic_key_and_ref_segments() {
    let data = node(json!({"m": {"y": 3}}));
    let spec = node(json!({"n": "`m.$REF:pick$`", "pick": "y", "y": "`$DATA.m.$KEY`"}));
    let out = transform(&data, &spec, None).unwrap();
    assert_eq!(out.to_value(), json!({"n": 3, "pick": "y", "y": 3}));
}

#[test]
fn test_unresolved_dynamic_segment_gives_nothing() {
    let data = node(json!({"m": {"y": 3}}));
    let spec = node(json!({"v": "`m.$GET:missing$`", "w": 1}));
    let out = transform(&data, &spec, None).unwrap();
    assert_eq!(out.to_value(), json!({"w": 1}));
}

#[test]
fn test_double_dollar_escape() {
    let data = node(json!({"a$b": 1}));
    let spec = node(json!({"v": "`a$$b`"}));
    let out = transform(&data, &spec, None).unwrap();
    assert_eq!(out.to_value(), json!({"v": 1}));
}

#[test]
fn test_meta_segment() {
    let spec = json!({"a": {"`$META`": {"KEY": "m"}}, "y": "`$META:a.KEY$`"});
    let out = transform(&node(json!({"m": 5})), &node(spec), None).unwrap();
    assert_eq!(out.to_value(), json!({"a": {}, "y": 5}));
}
