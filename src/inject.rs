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

//! # ZiStruct Injection Module
//!
//! This module implements the injection engine: a recursive rewrite of a
//! template tree in which backtick references are resolved against a store
//! and commands found in the store are run.
//!
//! ## Key Processing
//!
//! Every key of a container goes through three phases:
//!
//! 1. `key:pre`: the key is itself run through the template resolver. A
//!    command may rewrite the sibling key list or drop the key; a `None`
//!    result removes the key from a map and skips the remaining phases.
//! 2. `val`: strings are template-resolved, containers are recursed into.
//! 3. `key:post`: the key is resolved again, after its value is complete.
//!
//! Map keys without `$` are processed first in sorted order, then keys
//! containing `$` in sorted order. List slots are processed by index.
//!
//! ## Templates
//!
//! - **Full**: `` `a.b` `` (optionally followed by digits before the closing
//!   backtick) is replaced by the resolved value, keeping its type.
//! - **Partial**: `` x=`a.b` `` splices the rendered value into the text.
//!
//! ## Data-Parent Tracking
//!
//! The state carries `dparent`, the data node matching the current template
//! position. It is updated one level per recursion step, together with the
//! `dpath` taken from `droot`, so relative paths never need a full lookup.

use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::ZiStructConfig;
use crate::node::{get_prop, set_prop, str_key, stringify, ZiList, ZiMap, ZiNode};
use crate::path::{get_path_state, ZiPath};

/// Key of the virtual holder wrapping the template root.
pub const S_DTOP: &str = "$TOP";
/// Store key of the pristine spec copy.
pub const S_DSPEC: &str = "$SPEC";
/// Store key of the shared error list.
pub const S_DERRS: &str = "$ERRS";
/// Store key aliasing the source data.
pub const S_DDATA: &str = "$DATA";

/// Injection phase of the current key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZiInjectMode {
    KeyPre,
    Val,
    KeyPost,
}

impl ZiInjectMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZiInjectMode::KeyPre => "key:pre",
            ZiInjectMode::Val => "val",
            ZiInjectMode::KeyPost => "key:post",
        }
    }

    pub fn is_key(&self) -> bool {
        !matches!(self, ZiInjectMode::Val)
    }
}

impl fmt::Display for ZiInjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the sibling loop goes after the current key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZiInjectStep {
    /// Continue with `key_i + 1`.
    #[default]
    Next,
    /// Restart at the first key.
    Rewind,
    /// Visit `key_i` again (its slot was removed from a list).
    Stay,
}

/// Resolves a value found for a reference; may run it as a command.
pub type ZiHandler = fn(&mut ZiInjection, Option<ZiNode>, Option<&str>, &ZiNode) -> Option<ZiNode>;

/// Post-processing callback run after each value is injected.
///
/// Arguments: the value now in the parent, the key, the parent, the state
/// and the store.
pub type ZiModify = Rc<dyn Fn(Option<ZiNode>, &str, &ZiNode, &mut ZiInjection, &ZiNode)>;

/// Injection state for one recursion frame.
pub struct ZiInjection {
    pub mode: ZiInjectMode,
    /// The last template was a whole-string reference.
    pub full: bool,
    /// Index of the current key in `keys`.
    pub key_i: usize,
    /// Sibling keys still to be processed; commands may edit this.
    pub keys: Vec<String>,
    pub key: String,
    pub val: Option<ZiNode>,
    /// Container being written into.
    pub parent: ZiNode,
    /// Keys from the template root (starting with the holder key).
    pub path: Vec<String>,
    /// Ancestor containers, ending with `parent`.
    pub nodes: Vec<ZiNode>,
    pub handler: Option<ZiHandler>,
    pub errs: ZiList,
    pub meta: ZiMap,
    pub base: String,
    pub modify: Option<ZiModify>,
    /// Data node matching the current template position.
    pub dparent: Option<ZiNode>,
    /// Keys taken from `droot` to reach `dparent`.
    pub dpath: Vec<String>,
    pub droot: Option<ZiNode>,
    pub step: ZiInjectStep,
    /// A command wrote its own result; skip write-back and `modify`.
    pub detached: bool,
    pub config: Rc<ZiStructConfig>,
}

impl fmt::Debug for ZiInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiInjection")
            .field("mode", &self.mode)
            .field("full", &self.full)
            .field("key_i", &self.key_i)
            .field("keys", &self.keys)
            .field("key", &self.key)
            .field("path", &self.path)
            .field("dpath", &self.dpath)
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl ZiInjection {
    /// Root state for `val`, wrapped in a `{"$TOP": val}` holder.
    ///
    /// `current` is the data root; it defaults to `{"$TOP": store}`.
    pub fn root(
        val: Option<ZiNode>,
        store: &ZiNode,
        current: Option<ZiNode>,
        config: Rc<ZiStructConfig>,
    ) -> Self {
        let holder = ZiMap::new();
        if let Some(v) = &val {
            holder.insert(S_DTOP, v.clone());
        }
        let holder = ZiNode::Map(holder);

        let errs = match get_prop(store, S_DERRS) {
            Some(ZiNode::List(l)) => l,
            _ => ZiList::new(),
        };

        let current = current.unwrap_or_else(|| {
            let top = ZiMap::new();
            top.insert(S_DTOP, store.clone());
            ZiNode::Map(top)
        });

        ZiInjection {
            mode: ZiInjectMode::Val,
            full: false,
            key_i: 0,
            keys: vec![S_DTOP.to_string()],
            key: S_DTOP.to_string(),
            val,
            parent: holder.clone(),
            path: vec![S_DTOP.to_string()],
            nodes: vec![holder],
            handler: Some(inject_handler),
            errs,
            meta: ZiMap::new(),
            base: config.base.clone(),
            modify: None,
            dparent: Some(current.clone()),
            dpath: Vec::new(),
            droot: Some(current),
            step: ZiInjectStep::Next,
            detached: false,
            config,
        }
    }

    /// A `key:pre` state for `key` inside `container`.
    pub fn child(&self, key_i: usize, keys: Vec<String>, key: String, container: &ZiNode) -> Self {
        let mut path = self.path.clone();
        path.push(key.clone());
        let mut nodes = self.nodes.clone();
        nodes.push(container.clone());

        ZiInjection {
            mode: ZiInjectMode::KeyPre,
            full: false,
            key_i,
            keys,
            val: get_prop(container, &key),
            key,
            parent: container.clone(),
            path,
            nodes,
            handler: self.handler,
            errs: self.errs.clone(),
            meta: self.meta.clone(),
            base: self.base.clone(),
            modify: self.modify.clone(),
            dparent: self.dparent.clone(),
            dpath: self.dpath.clone(),
            droot: self.droot.clone(),
            step: ZiInjectStep::Next,
            detached: false,
            config: self.config.clone(),
        }
    }

    /// Move the data-parent one level down, following the template.
    pub fn descend(&mut self) {
        if self.path.len() > 1 {
            let pkey = self.path[self.path.len() - 2].clone();
            self.dparent = self.dparent.as_ref().and_then(|d| get_prop(d, &pkey));
            self.dpath.push(pkey);
        }
    }

    /// Write `val` at the current key (`ancestor < 2`), or at the slot
    /// `ancestor` levels up the template. `None` deletes.
    pub fn set_val(&self, val: Option<ZiNode>, ancestor: usize) {
        if ancestor < 2 {
            set_prop(&self.parent, &self.key, val);
        } else if let Some((node, key)) = self.ancestor(ancestor) {
            set_prop(&node, &key, val);
        }
    }

    /// Container and key `ancestor` levels up (2 is the grandparent slot).
    pub fn ancestor(&self, ancestor: usize) -> Option<(ZiNode, String)> {
        let ancestor = ancestor.max(1);
        if self.nodes.len() < ancestor || self.path.len() < ancestor {
            return None;
        }
        Some((
            self.nodes[self.nodes.len() - ancestor].clone(),
            self.path[self.path.len() - ancestor].clone(),
        ))
    }

    /// Delete the current key. In a list the later slots shift down, so the
    /// loop stays on this index and the state detaches: the slot now holds
    /// a sibling that has not been injected yet.
    pub fn remove_slot(&mut self) {
        set_prop(&self.parent, &self.key, None);
        if self.parent.is_list() {
            self.keys.pop();
            self.step = ZiInjectStep::Stay;
            self.detached = true;
        }
    }

    /// Data value at the current key.
    pub fn current(&self) -> Option<ZiNode> {
        self.dparent.as_ref().and_then(|d| get_prop(d, &self.key))
    }

    /// Record a message on the shared error list.
    pub fn push_err(&self, message: impl Into<String>) {
        let message = message.into();
        log::debug!("collected error at {}: {}", self.path.join("."), message);
        self.errs.push(ZiNode::String(message));
    }

    /// Inject `val` as a new root against `current`, inheriting this
    /// state's modify callback and configuration.
    pub fn inject_nested(&self, val: ZiNode, store: &ZiNode, current: ZiNode) -> Option<ZiNode> {
        let mut inj = ZiInjection::root(Some(val.clone()), store, Some(current), self.config.clone());
        inj.modify = self.modify.clone();
        inj.handler = self.handler;
        inj.meta = self.meta.clone();
        inject_state(Some(val), store, &mut inj);
        get_prop(&inj.parent, S_DTOP)
    }
}

fn full_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^`(\$[A-Z]+|[^`]+)[0-9]*`$").expect("literal pattern compiles"))
}

fn part_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("literal pattern compiles"))
}

fn unescape(reference: &str) -> String {
    if reference.len() > 3 {
        reference.replace("$BT", "`").replace("$DS", "$")
    } else {
        reference.to_string()
    }
}

/// Inject values from `store` into `val` with default settings.
pub fn inject(val: &ZiNode, store: &ZiNode) -> Option<ZiNode> {
    inject_with(val.clone(), store, None, None, Rc::new(ZiStructConfig::default()))
}

/// Inject with an optional modify callback and data root.
pub fn inject_with(
    val: ZiNode,
    store: &ZiNode,
    modify: Option<ZiModify>,
    current: Option<ZiNode>,
    config: Rc<ZiStructConfig>,
) -> Option<ZiNode> {
    let mut inj = ZiInjection::root(Some(val.clone()), store, current, config);
    inj.modify = modify;
    inject_state(Some(val), store, &mut inj);
    get_prop(&inj.parent, S_DTOP)
}

/// Inject `val` at the position described by `inj`.
pub fn inject_state(val: Option<ZiNode>, store: &ZiNode, inj: &mut ZiInjection) {
    inj.descend();

    match &val {
        Some(node) if node.is_node() => inject_container(node, store, inj),
        Some(ZiNode::String(s)) => {
            inj.mode = ZiInjectMode::Val;
            let out = inject_str(s, store, inj);
            if !inj.detached {
                match out {
                    Some(v) => set_prop(&inj.parent, &inj.key, Some(v)),
                    None => inj.remove_slot(),
                }
            }
        }
        _ => {}
    }

    if inj.detached {
        return;
    }
    if let Some(modify) = inj.modify.clone() {
        let key = inj.key.clone();
        let parent = inj.parent.clone();
        let mval = get_prop(&parent, &key);
        modify(mval, &key, &parent, inj, store);
    }
}

fn ordered_keys(node: &ZiNode) -> Vec<String> {
    match node {
        ZiNode::Map(m) => {
            let (plain, cmds): (Vec<String>, Vec<String>) =
                m.keys().into_iter().partition(|k| !k.contains('$'));
            plain.into_iter().chain(cmds).collect()
        }
        ZiNode::List(l) => (0..l.len()).map(|i| i.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn inject_container(node: &ZiNode, store: &ZiNode, inj: &ZiInjection) {
    let mut keys = ordered_keys(node);
    let mut nk_i = 0;

    while nk_i < keys.len() {
        let key = keys[nk_i].clone();
        let mut child = inj.child(nk_i, mem::take(&mut keys), key.clone(), node);

        let prekey = inject_str(&key, store, &mut child);

        if let Some(prekey) = prekey {
            let child_val = get_prop(node, &str_key(Some(&prekey)));
            child.mode = ZiInjectMode::Val;
            child.val = child_val.clone();

            let saved = (child.dparent.clone(), child.dpath.clone());
            inject_state(child_val, store, &mut child);
            (child.dparent, child.dpath) = saved;

            child.mode = ZiInjectMode::KeyPost;
            inject_str(&key, store, &mut child);
        } else if node.is_map() {
            set_prop(node, &key, None);
        }

        keys = mem::take(&mut child.keys);
        nk_i = match child.step {
            ZiInjectStep::Next => child.key_i + 1,
            ZiInjectStep::Rewind => 0,
            ZiInjectStep::Stay => child.key_i,
        };
    }
}

/// Resolve the backtick templates in `val`.
///
/// A whole-string reference returns the resolved value with its type; any
/// other string is returned as text with each reference spliced in.
pub fn inject_str(val: &str, store: &ZiNode, inj: &mut ZiInjection) -> Option<ZiNode> {
    if val.is_empty() {
        return Some(ZiNode::String(String::new()));
    }

    if let Some(caps) = full_re().captures(val) {
        inj.full = true;
        let reference = unescape(caps.get(1).map(|m| m.as_str()).unwrap_or_default());
        return get_path_state(&ZiPath::parse(&reference), store, inj);
    }

    let mut out = String::with_capacity(val.len());
    let mut last = 0;
    for caps in part_re().captures_iter(val) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        out.push_str(&val[last..whole.start()]);
        last = whole.end();

        let reference = unescape(inner.as_str());
        inj.full = false;
        let found = get_path_state(&ZiPath::parse(&reference), store, inj);
        match found {
            None => {}
            Some(ZiNode::String(s)) => out.push_str(&s),
            Some(node) if node.is_node() => out.push_str(&node.to_string()),
            Some(other) => out.push_str(&stringify(Some(&other), None)),
        }
    }
    out.push_str(&val[last..]);

    inj.full = true;
    let out = ZiNode::String(out);
    match inj.handler {
        Some(handler) => handler(inj, Some(out), Some(val), store),
        None => Some(out),
    }
}

/// Default handler: run commands named by a `$` reference, otherwise keep
/// whole-string values in the output.
pub fn inject_handler(
    inj: &mut ZiInjection,
    val: Option<ZiNode>,
    reference: Option<&str>,
    store: &ZiNode,
) -> Option<ZiNode> {
    let command = match &val {
        Some(ZiNode::Command(c)) if reference.map_or(true, |r| r.starts_with('$')) => Some(c.clone()),
        _ => None,
    };
    if let Some(command) = command {
        log::trace!("{} at {} ({})", command.name(), inj.path.join("."), inj.mode);
        return command.apply(inj, val, store);
    }

    // A missing value is removed by the caller, which also fixes up the
    // sibling loop when the parent is a list.
    if inj.mode == ZiInjectMode::Val && inj.full && val.is_some() {
        inj.set_val(val.clone(), 0);
    }
    val
}
