//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # ZiStruct Node Module
//!
//! This module provides the tree representation every other part of ZiStruct
//! works on, together with the small property helpers used to read and write
//! it.
//!
//! ## Design
//!
//! - **Tagged union**: [`ZiNode`] is a map, a list, a scalar or a command.
//!   Absence ("none") is `Option<ZiNode>::None`, which is not the same thing
//!   as JSON `null`.
//! - **Stable handles**: [`ZiMap`] and [`ZiList`] are shared handles to their
//!   contents. Cloning a node clones the handle, so a container written into
//!   a parent stays the same container when it is later resized. Use
//!   [`ZiNode::deep_clone`] (or [`clone`]) for a structural copy.
//! - **Sorted maps**: map iteration is always in key order.
//!
//! ## Usage Example
//!
//! ```rust
//! use zistruct::node::{get_prop, set_prop, ZiNode};
//! use serde_json::json;
//!
//! let list = ZiNode::from(json!(["a", "b", "c"]));
//! set_prop(&list, "1", None);
//! assert_eq!(list.to_value(), json!(["a", "c"]));
//! assert_eq!(get_prop(&list, "0"), Some(ZiNode::from("a")));
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Number, Value};

use crate::command::ZiCommand;

pub const S_NULL: &str = "null";
pub const S_BOOLEAN: &str = "boolean";
pub const S_NUMBER: &str = "number";
pub const S_STRING: &str = "string";
pub const S_FUNCTION: &str = "function";
pub const S_ARRAY: &str = "array";
pub const S_OBJECT: &str = "object";

/// Shared handle to an ordered list of nodes.
#[derive(Clone, Debug, Default)]
pub struct ZiList(Rc<RefCell<Vec<ZiNode>>>);

impl ZiList {
    pub fn new() -> Self {
        ZiList::default()
    }

    pub fn from_vec(items: Vec<ZiNode>) -> Self {
        ZiList(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ZiNode> {
        self.0.borrow().get(index).cloned()
    }

    /// Overwrite the element at `index`; out of range indexes are ignored.
    pub fn set(&self, index: usize, val: ZiNode) {
        if let Some(slot) = self.0.borrow_mut().get_mut(index) {
            *slot = val;
        }
    }

    pub fn push(&self, val: ZiNode) {
        self.0.borrow_mut().push(val);
    }

    pub fn insert(&self, index: usize, val: ZiNode) {
        let mut items = self.0.borrow_mut();
        let index = index.min(items.len());
        items.insert(index, val);
    }

    pub fn remove(&self, index: usize) -> Option<ZiNode> {
        let mut items = self.0.borrow_mut();
        if index < items.len() {
            Some(items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Replace the whole contents while keeping this handle.
    pub fn replace(&self, items: Vec<ZiNode>) {
        *self.0.borrow_mut() = items;
    }

    /// Shallow snapshot of the elements.
    pub fn to_vec(&self) -> Vec<ZiNode> {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &ZiList) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Shared handle to a key-sorted map of nodes.
#[derive(Clone, Debug, Default)]
pub struct ZiMap(Rc<RefCell<BTreeMap<String, ZiNode>>>);

impl ZiMap {
    pub fn new() -> Self {
        ZiMap::default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<ZiNode> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, val: ZiNode) {
        self.0.borrow_mut().insert(key.into(), val);
    }

    pub fn remove(&self, key: &str) -> Option<ZiNode> {
        self.0.borrow_mut().remove(key)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Sorted keys.
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Sorted shallow entries.
    pub fn entries(&self) -> Vec<(String, ZiNode)> {
        self.0
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &ZiMap) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<(String, ZiNode)> for ZiMap {
    fn from_iter<I: IntoIterator<Item = (String, ZiNode)>>(iter: I) -> Self {
        ZiMap(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}

/// A value in a tree being transformed or validated.
#[derive(Clone, Debug)]
pub enum ZiNode {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(ZiList),
    Map(ZiMap),
    /// A callable bound into the store under a `$NAME` key.
    Command(Rc<dyn ZiCommand>),
}

impl ZiNode {
    pub fn new_map() -> Self {
        ZiNode::Map(ZiMap::new())
    }

    pub fn new_list() -> Self {
        ZiNode::List(ZiList::new())
    }

    pub fn list(items: Vec<ZiNode>) -> Self {
        ZiNode::List(ZiList::from_vec(items))
    }

    pub fn command<C: ZiCommand + 'static>(command: C) -> Self {
        ZiNode::Command(Rc::new(command))
    }

    /// A container: map or list.
    pub fn is_node(&self) -> bool {
        matches!(self, ZiNode::Map(_) | ZiNode::List(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, ZiNode::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ZiNode::List(_))
    }

    pub fn is_command(&self) -> bool {
        matches!(self, ZiNode::Command(_))
    }

    pub fn as_map(&self) -> Option<&ZiMap> {
        match self {
            ZiNode::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ZiList> {
        match self {
            ZiNode::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ZiNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ZiNode::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Both values are containers of the same kind.
    pub fn same_kind(&self, other: &ZiNode) -> bool {
        matches!(
            (self, other),
            (ZiNode::Map(_), ZiNode::Map(_)) | (ZiNode::List(_), ZiNode::List(_))
        )
    }

    /// A new, empty container of the same kind as this one (map otherwise).
    pub fn empty_like(&self) -> ZiNode {
        match self {
            ZiNode::List(_) => ZiNode::new_list(),
            _ => ZiNode::new_map(),
        }
    }

    /// Property lookup; see [`get_prop`].
    pub fn get(&self, key: &str) -> Option<ZiNode> {
        get_prop(self, key)
    }

    /// Structural copy. Commands are copied by reference.
    pub fn deep_clone(&self) -> ZiNode {
        match self {
            ZiNode::Map(m) => ZiNode::Map(
                m.entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.deep_clone()))
                    .collect(),
            ),
            ZiNode::List(l) => {
                ZiNode::list(l.to_vec().iter().map(ZiNode::deep_clone).collect())
            }
            other => other.clone(),
        }
    }

    /// Convert to plain JSON. Commands render as their name.
    pub fn to_value(&self) -> Value {
        match self {
            ZiNode::Null => Value::Null,
            ZiNode::Bool(b) => Value::Bool(*b),
            ZiNode::Number(n) => Value::Number(n.clone()),
            ZiNode::String(s) => Value::String(s.clone()),
            ZiNode::List(l) => Value::Array(l.to_vec().iter().map(ZiNode::to_value).collect()),
            ZiNode::Map(m) => Value::Object(
                m.entries()
                    .into_iter()
                    .map(|(k, v)| (k, v.to_value()))
                    .collect::<Map<String, Value>>(),
            ),
            ZiNode::Command(c) => Value::String(c.name().to_string()),
        }
    }
}

impl From<Value> for ZiNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ZiNode::Null,
            Value::Bool(b) => ZiNode::Bool(b),
            Value::Number(n) => ZiNode::Number(n),
            Value::String(s) => ZiNode::String(s),
            Value::Array(items) => ZiNode::list(items.into_iter().map(ZiNode::from).collect()),
            Value::Object(map) => ZiNode::Map(
                map.into_iter()
                    .map(|(k, v)| (k, ZiNode::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&Value> for ZiNode {
    fn from(value: &Value) -> Self {
        ZiNode::from(value.clone())
    }
}

impl From<&str> for ZiNode {
    fn from(s: &str) -> Self {
        ZiNode::String(s.to_string())
    }
}

impl From<String> for ZiNode {
    fn from(s: String) -> Self {
        ZiNode::String(s)
    }
}

impl From<bool> for ZiNode {
    fn from(b: bool) -> Self {
        ZiNode::Bool(b)
    }
}

impl From<i64> for ZiNode {
    fn from(n: i64) -> Self {
        ZiNode::Number(Number::from(n))
    }
}

impl From<ZiMap> for ZiNode {
    fn from(m: ZiMap) -> Self {
        ZiNode::Map(m)
    }
}

impl From<ZiList> for ZiNode {
    fn from(l: ZiList) -> Self {
        ZiNode::List(l)
    }
}

fn number_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for ZiNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ZiNode::Null, ZiNode::Null) => true,
            (ZiNode::Bool(a), ZiNode::Bool(b)) => a == b,
            (ZiNode::Number(a), ZiNode::Number(b)) => number_eq(a, b),
            (ZiNode::String(a), ZiNode::String(b)) => a == b,
            (ZiNode::List(a), ZiNode::List(b)) => a.ptr_eq(b) || a.to_vec() == b.to_vec(),
            (ZiNode::Map(a), ZiNode::Map(b)) => a.ptr_eq(b) || a.entries() == b.entries(),
            (ZiNode::Command(a), ZiNode::Command(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for ZiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

impl Serialize for ZiNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ZiNode::Null => serializer.serialize_unit(),
            ZiNode::Bool(b) => serializer.serialize_bool(*b),
            ZiNode::Number(n) => n.serialize(serializer),
            ZiNode::String(s) => serializer.serialize_str(s),
            ZiNode::List(l) => {
                let items = l.to_vec();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ZiNode::Map(m) => {
                let entries = m.entries();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in &entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            ZiNode::Command(c) => serializer.serialize_str(c.name()),
        }
    }
}

impl<'de> Deserialize<'de> for ZiNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ZiNode::from)
    }
}

/// Deep structural copy of an optional value.
pub fn clone(val: Option<&ZiNode>) -> Option<ZiNode> {
    val.map(ZiNode::deep_clone)
}

fn list_index(key: &str) -> Option<i64> {
    key.trim().parse::<i64>().ok()
}

/// Safely read a property of a container.
///
/// Map keys are strings; list keys are parsed as integer indexes. Anything
/// missing, or a scalar `val`, gives `None`.
pub fn get_prop(val: &ZiNode, key: &str) -> Option<ZiNode> {
    match val {
        ZiNode::Map(m) => m.get(key),
        ZiNode::List(l) => {
            let index = list_index(key)?;
            if index < 0 {
                return None;
            }
            l.get(index as usize)
        }
        _ => None,
    }
}

/// Read a property, falling back to `alt` when absent.
pub fn get_prop_or(val: &ZiNode, key: &str, alt: ZiNode) -> ZiNode {
    get_prop(val, key).unwrap_or(alt)
}

/// Safely write a property of a container.
///
/// - `None` deletes; in a list the later elements shift down.
/// - A negative list index prepends.
/// - A list index at or past the end appends.
///
/// Empty keys, non-numeric list keys and scalar parents are ignored.
pub fn set_prop(parent: &ZiNode, key: &str, val: Option<ZiNode>) {
    if key.is_empty() {
        return;
    }
    match parent {
        ZiNode::Map(m) => match val {
            Some(v) => m.insert(key, v),
            None => {
                m.remove(key);
            }
        },
        ZiNode::List(l) => {
            let Some(index) = list_index(key) else {
                return;
            };
            match val {
                None => {
                    if index >= 0 {
                        l.remove(index as usize);
                    }
                }
                Some(v) if index < 0 => l.insert(0, v),
                Some(v) if index as usize >= l.len() => l.push(v),
                Some(v) => l.set(index as usize, v),
            }
        }
        _ => {}
    }
}

/// Defined property of a container.
pub fn has_key(val: &ZiNode, key: &str) -> bool {
    get_prop(val, key).is_some()
}

/// Sorted map keys, or list indexes as strings.
pub fn keys_of(val: &ZiNode) -> Vec<String> {
    match val {
        ZiNode::Map(m) => m.keys(),
        ZiNode::List(l) => (0..l.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

/// Key/value pairs: map entries by sorted key, list entries by index.
pub fn items(val: &ZiNode) -> Vec<(String, ZiNode)> {
    match val {
        ZiNode::Map(m) => m.entries(),
        ZiNode::List(l) => l
            .to_vec()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}

/// None, empty string, empty list or empty map.
pub fn is_empty(val: Option<&ZiNode>) -> bool {
    match val {
        None => true,
        Some(ZiNode::String(s)) => s.is_empty(),
        Some(ZiNode::List(l)) => l.is_empty(),
        Some(ZiNode::Map(m)) => m.is_empty(),
        Some(_) => false,
    }
}

/// Runtime type name of a value.
pub fn typify(val: Option<&ZiNode>) -> &'static str {
    match val {
        None | Some(ZiNode::Null) => S_NULL,
        Some(ZiNode::Bool(_)) => S_BOOLEAN,
        Some(ZiNode::Number(_)) => S_NUMBER,
        Some(ZiNode::String(_)) => S_STRING,
        Some(ZiNode::Command(_)) => S_FUNCTION,
        Some(ZiNode::List(_)) => S_ARRAY,
        Some(ZiNode::Map(_)) => S_OBJECT,
    }
}

/// Render a value as a key: strings as-is, numbers as integers.
pub fn str_key(val: Option<&ZiNode>) -> String {
    match val {
        Some(ZiNode::String(s)) => s.clone(),
        Some(ZiNode::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => (f.floor() as i64).to_string(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Human-readable rendering for messages (not JSON): quotes are dropped.
pub fn stringify(val: Option<&ZiNode>, maxlen: Option<usize>) -> String {
    let text = match val {
        None => return String::new(),
        Some(ZiNode::String(s)) => s.clone(),
        Some(node) => node.to_string().replace('"', ""),
    };

    match maxlen {
        Some(max) if text.chars().count() > max => {
            if max > 3 {
                let mut cut: String = text.chars().take(max - 3).collect();
                cut.push_str("...");
                cut
            } else {
                text.chars().take(max).collect()
            }
        }
        _ => text,
    }
}

/// Dotted rendering of a path, starting at segment `from`.
///
/// Dots inside segments are removed so the result stays unambiguous.
pub fn pathify<S: AsRef<str>>(path: &[S], from: usize) -> String {
    let start = from.min(path.len());
    let parts: Vec<String> = path[start..]
        .iter()
        .map(|p| p.as_ref().replace('.', ""))
        .filter(|p| !p.is_empty())
        .collect();
    if parts.is_empty() {
        "<root>".to_string()
    } else {
        parts.join(".")
    }
}

/// Escape a string for literal use inside a regular expression.
pub fn escre(s: &str) -> String {
    regex::escape(s)
}
