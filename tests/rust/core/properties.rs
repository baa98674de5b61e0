//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use zistruct::{get_path, merge, transform, ZiNode};

// -- Strategy helpers --

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

fn arb_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-z]{1,3}", arb_json(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

fn nodes(values: &[&Value]) -> Vec<ZiNode> {
    values.iter().map(|v| ZiNode::from(*v)).collect()
}

fn nest(keys: &[String], leaf: Value) -> Value {
    keys.iter().rev().fold(leaf, |acc, key| {
        let mut map = Map::new();
        map.insert(key.clone(), acc);
        Value::Object(map)
    })
}

proptest! {
    #[test]
    fn transform_of_plain_data_is_identity(data in arb_json()) {
        let node = ZiNode::from(&data);
        let out = transform(&node, &node, None).map(|n| n.to_value());
        prop_assert_eq!(out, Some(data));
    }

    #[test]
    fn merge_is_a_left_fold(a in arb_object(), b in arb_object(), c in arb_object()) {
        let all = merge(&nodes(&[&a, &b, &c])).map(|n| n.to_value());
        let ab = merge(&nodes(&[&a, &b])).unwrap_or_else(ZiNode::new_map);
        let stepwise = merge(&[ab, ZiNode::from(&c)]).map(|n| n.to_value());
        prop_assert_eq!(all, stepwise);
    }

    #[test]
    fn merge_last_scalar_wins(a in arb_object(), b in arb_object()) {
        let out = merge(&nodes(&[&a, &b])).map(|n| n.to_value()).unwrap_or(Value::Null);
        if let Value::Object(b) = &b {
            for (key, val) in b {
                if !val.is_object() && !val.is_array() {
                    prop_assert_eq!(&out[key.as_str()], val);
                }
            }
        }
    }

    #[test]
    fn merge_never_blends_kinds(a in arb_object(), b in prop::collection::vec(arb_leaf(), 0..4)) {
        let b = Value::Array(b);
        let out = merge(&nodes(&[&a, &b])).map(|n| n.to_value());
        prop_assert_eq!(out, Some(b));
    }

    #[test]
    fn get_path_finds_nested_values(
        keys in prop::collection::vec("[a-z]{1,5}", 1..5),
        leaf in arb_leaf(),
    ) {
        let store = ZiNode::from(nest(&keys, leaf.clone()));
        let by_string = get_path(keys.join("."), &store).map(|n| n.to_value());
        let by_segments = get_path(keys.clone(), &store).map(|n| n.to_value());
        prop_assert_eq!(by_string, Some(leaf.clone()));
        prop_assert_eq!(by_segments, Some(leaf));
    }
}
