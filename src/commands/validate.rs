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

//! # Validation Commands
//!
//! Validators read the data value at the current key, push a message onto
//! the shared error list when it does not fit, and otherwise hand the data
//! value back so it lands in the output.
//!
//! Plain spec values are checked afterwards by [`validation_modify`]: the
//! spec value is a default that also fixes the required type.

use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::command::ZiCommand;
use crate::errors::ZiViolation;
use crate::inject::{ZiInjectMode, ZiInjectStep, ZiInjection, ZiModify};
use crate::merge::merge;
use crate::node::{
    get_prop, pathify, set_prop, stringify, typify, ZiList, ZiMap, ZiNode, S_ARRAY, S_BOOLEAN,
    S_FUNCTION, S_NUMBER, S_OBJECT, S_STRING,
};
use crate::validate::validate_collect;

/// Map marker that keeps a non-empty shape open to extra keys.
pub const S_BOPEN: &str = "`$OPEN`";

fn command_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`\$([A-Z]+)`").expect("literal pattern compiles"))
}

/// Type-mismatch violation for the value at `path`.
pub fn invalid_type(
    inj: &ZiInjection,
    path: &[String],
    expected: &str,
    found: Option<&ZiNode>,
) -> ZiViolation {
    ZiViolation::TypeMismatch {
        field: field_of(path),
        expected: expected.to_string(),
        found: found.map(|v| found_of(inj, v)),
    }
}

fn field_of(path: &[String]) -> Option<String> {
    (path.len() > 1).then(|| pathify(path, 1))
}

fn found_of(inj: &ZiInjection, val: &ZiNode) -> (String, String) {
    (
        typify(Some(val)).to_string(),
        stringify(Some(val), inj.config.value_maxlen),
    )
}

fn parent_path(inj: &ZiInjection) -> &[String] {
    &inj.path[..inj.path.len().saturating_sub(1)]
}

/// Commands are only meaningful as the first element of a list.
fn first_in_list(inj: &ZiInjection, name: &str) -> bool {
    if inj.mode == ZiInjectMode::Val && inj.parent.is_list() && inj.key == "0" {
        return true;
    }
    if inj.mode == ZiInjectMode::KeyPre {
        set_prop(&inj.parent, &inj.key, None);
    }
    let message = format!(
        "The {} validator at field {} must be the first element of an array.",
        name,
        pathify(parent_path(inj), 1)
    );
    log::warn!("{message}");
    inj.push_err(ZiViolation::Malformed(message).to_string());
    false
}

/// Outcome of a failed check. A map entry is dropped; a list slot keeps the
/// data value so later slots stay aligned with their data.
fn rejected(inj: &mut ZiInjection, found: Option<ZiNode>) -> Option<ZiNode> {
    if !inj.parent.is_list() {
        return None;
    }
    inj.set_val(Some(found.clone().unwrap_or(ZiNode::Null)), 0);
    inj.detached = true;
    found
}

/// Required value of one runtime type.
#[derive(Debug)]
pub struct ZiTypeCheck {
    name: &'static str,
    expected: &'static str,
}

impl ZiTypeCheck {
    /// `$STRING`: a non-empty string.
    pub fn string() -> Self {
        ZiTypeCheck {
            name: "$STRING",
            expected: S_STRING,
        }
    }

    pub fn number() -> Self {
        ZiTypeCheck {
            name: "$NUMBER",
            expected: S_NUMBER,
        }
    }

    pub fn boolean() -> Self {
        ZiTypeCheck {
            name: "$BOOLEAN",
            expected: S_BOOLEAN,
        }
    }

    pub fn object() -> Self {
        ZiTypeCheck {
            name: "$OBJECT",
            expected: S_OBJECT,
        }
    }

    pub fn array() -> Self {
        ZiTypeCheck {
            name: "$ARRAY",
            expected: S_ARRAY,
        }
    }

    /// `$FUNCTION`: a command value.
    pub fn function() -> Self {
        ZiTypeCheck {
            name: "$FUNCTION",
            expected: S_FUNCTION,
        }
    }
}

impl ZiCommand for ZiTypeCheck {
    fn name(&self) -> &str {
        self.name
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        let out = inj.current();

        if let (S_STRING, Some(ZiNode::String(s))) = (self.expected, &out) {
            if s.is_empty() {
                let field = pathify(&inj.path, 1);
                inj.push_err(ZiViolation::EmptyString { field }.to_string());
                return rejected(inj, out);
            }
        }

        if typify(out.as_ref()) != self.expected {
            let violation = invalid_type(inj, &inj.path, self.expected, out.as_ref());
            inj.push_err(violation.to_string());
            return rejected(inj, out);
        }
        out
    }
}

/// `$ANY`: whatever the data holds.
#[derive(Debug)]
pub struct ZiAny;

impl ZiCommand for ZiAny {
    fn name(&self) -> &str {
        "$ANY"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        inj.current()
    }
}

/// `$OPEN`: keeps the marker in place for the shape check to read.
#[derive(Debug)]
pub struct ZiOpen;

impl ZiCommand for ZiOpen {
    fn name(&self) -> &str {
        "$OPEN"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        if inj.mode.is_key() {
            Some(ZiNode::from(inj.key.as_str()))
        } else {
            inj.val.clone()
        }
    }
}

/// `$CHILD`: one template copy per data entry.
///
/// Map form `{"`$CHILD`": tmpl}` covers every data key the shape does not
/// already name. List form `["`$CHILD`", tmpl]` covers every data index.
#[derive(Debug)]
pub struct ZiChild;

impl ZiChild {
    fn map_form(inj: &mut ZiInjection) -> Option<ZiNode> {
        let parent = inj.parent.clone();
        let template = get_prop(&parent, &inj.key);
        set_prop(&parent, &inj.key, None);

        let pkey = inj.path.len().checked_sub(2).map(|i| inj.path[i].clone())?;
        let tval = inj.dparent.as_ref().and_then(|d| get_prop(d, &pkey));

        let data = match tval {
            None => return None,
            Some(ZiNode::Map(m)) => m,
            Some(other) => {
                let violation = invalid_type(inj, parent_path(inj), S_OBJECT, Some(&other));
                inj.push_err(violation.to_string());
                inj.set_val(Some(other), 2);
                inj.key_i = inj.keys.len();
                return None;
            }
        };

        let template = template.unwrap_or(ZiNode::Null);
        for ckey in data.keys() {
            if get_prop(&parent, &ckey).is_some() {
                continue;
            }
            set_prop(&parent, &ckey, Some(template.deep_clone()));
            inj.keys.push(ckey);
        }
        None
    }

    fn list_form(inj: &mut ZiInjection) -> Option<ZiNode> {
        let Some(list) = inj.parent.as_list().cloned() else {
            inj.push_err(ZiViolation::Malformed("Invalid $CHILD as value".to_string()).to_string());
            return None;
        };
        let template = list.get(1).unwrap_or(ZiNode::Null);
        inj.detached = true;

        match inj.dparent.clone() {
            None => {
                list.clear();
                inj.keys.clear();
                None
            }
            Some(ZiNode::List(data)) => {
                let n = data.len();
                list.replace((0..n).map(|_| template.deep_clone()).collect());
                // Revisit the slots, now holding one template each.
                inj.keys = (0..n).map(|i| i.to_string()).collect();
                inj.step = ZiInjectStep::Rewind;
                None
            }
            Some(other) => {
                let violation = invalid_type(inj, parent_path(inj), S_ARRAY, Some(&other));
                inj.push_err(violation.to_string());
                inj.set_val(Some(other.clone()), 2);
                inj.key_i = inj.keys.len();
                Some(other)
            }
        }
    }
}

impl ZiCommand for ZiChild {
    fn name(&self) -> &str {
        "$CHILD"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        match inj.mode {
            ZiInjectMode::KeyPre => ZiChild::map_form(inj),
            ZiInjectMode::Val => ZiChild::list_form(inj),
            ZiInjectMode::KeyPost => None,
        }
    }
}

/// Commands currently bound in `store`, passed down to nested validations.
fn store_commands(store: &ZiNode) -> ZiNode {
    let commands: ZiMap = store
        .as_map()
        .map(|m| m.entries())
        .unwrap_or_default()
        .into_iter()
        .filter(|(k, v)| k.starts_with('$') && v.is_command())
        .collect();
    ZiNode::Map(commands)
}

fn alternatives(inj: &ZiInjection) -> Vec<ZiNode> {
    inj.parent
        .as_list()
        .map(|l| l.to_vec().into_iter().skip(1).collect())
        .unwrap_or_default()
}

/// `$ONE`: `["`$ONE`", alt, ...]`, the data must satisfy one alternative.
#[derive(Debug)]
pub struct ZiOne;

impl ZiCommand for ZiOne {
    fn name(&self) -> &str {
        "$ONE"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        if !first_in_list(inj, "$ONE") {
            return None;
        }
        inj.key_i = inj.keys.len();
        inj.detached = true;

        let current = inj.dparent.clone();
        let alts = alternatives(inj);
        let (target, tkey) = inj.ancestor(2)?;
        let extra = store_commands(store);

        for alt in &alts {
            let terrs = ZiList::new();
            validate_collect(current.clone(), alt, Some(&extra), &terrs, &inj.config);
            if terrs.is_empty() {
                set_prop(&target, &tkey, current);
                return None;
            }
        }
        set_prop(&target, &tkey, current.clone());

        let described = alts
            .iter()
            .map(|a| stringify(Some(a), None))
            .collect::<Vec<_>>()
            .join(", ");
        let described = command_re().replace_all(&described, |caps: &regex::Captures| {
            caps[1].to_lowercase()
        });
        let violation = invalid_type(
            inj,
            parent_path(inj),
            &format!("one of {described}"),
            current.as_ref(),
        );
        inj.push_err(violation.to_string());
        None
    }
}

/// `$EXACT`: `["`$EXACT`", value, ...]`, the data must equal one value.
#[derive(Debug)]
pub struct ZiExact;

fn exactly(alt: &ZiNode, current: Option<&ZiNode>) -> bool {
    let Some(current) = current else {
        return false;
    };
    alt == current
        || (alt.is_node() && stringify(Some(alt), None) == stringify(Some(current), None))
}

impl ZiCommand for ZiExact {
    fn name(&self) -> &str {
        "$EXACT"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        if !first_in_list(inj, "$EXACT") {
            return None;
        }
        inj.key_i = inj.keys.len();
        inj.detached = true;

        let current = inj.dparent.clone();
        let alts = alternatives(inj);
        let (target, tkey) = inj.ancestor(2)?;
        set_prop(&target, &tkey, current.clone());

        if alts.iter().any(|alt| exactly(alt, current.as_ref())) {
            return None;
        }

        let violation = ZiViolation::NotExact {
            field: field_of(parent_path(inj)),
            choices: alts.iter().map(|a| stringify(Some(a), None)).collect(),
            found: current.as_ref().map(|c| found_of(inj, c)),
        };
        inj.push_err(violation.to_string());
        None
    }
}

/// Shape check run after each spec value has been injected.
pub fn validation_modify() -> ZiModify {
    Rc::new(check_shape)
}

fn check_shape(
    pval: Option<ZiNode>,
    key: &str,
    parent: &ZiNode,
    inj: &mut ZiInjection,
    _store: &ZiNode,
) {
    let mut open = false;
    if let Some(ZiNode::Map(m)) = &pval {
        open = m.remove(S_BOPEN).and_then(|o| o.as_bool()).unwrap_or(false);
    }

    let cval = inj.dparent.as_ref().and_then(|d| get_prop(d, key));
    let (Some(pval), Some(cval)) = (pval, cval) else {
        return;
    };

    if let ZiNode::String(s) = &pval {
        if s.contains('$') {
            return;
        }
    }

    let ptype = typify(Some(&pval));
    if ptype != typify(Some(&cval)) {
        let violation = invalid_type(inj, &inj.path, ptype, Some(&cval));
        inj.push_err(violation.to_string());
        return;
    }

    match (&pval, &cval) {
        (ZiNode::Map(pm), ZiNode::Map(cm)) => {
            if !pm.is_empty() && !open {
                let bad: Vec<String> = cm.keys().into_iter().filter(|k| !pm.contains_key(k)).collect();
                if !bad.is_empty() {
                    let violation = ZiViolation::UnexpectedKeys {
                        field: pathify(&inj.path, 1),
                        keys: bad,
                    };
                    inj.push_err(violation.to_string());
                }
            } else {
                merge(&[pval.clone(), cval.clone()]);
            }
        }
        (ZiNode::List(_), ZiNode::List(_)) => {}
        _ => set_prop(parent, key, Some(cval)),
    }
}
