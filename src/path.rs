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

//! # ZiStruct Path Module
//!
//! This module resolves dotted or segmented paths against a store.
//!
//! ## Path Forms
//!
//! - `a.b.c`: absolute. The first segment is looked up in the store itself,
//!   then (when an injection state is present) in the store's base entry.
//! - `.a`, `.`: relative to the current data-parent.
//! - `..a`, `...a`: ascend one (two, ...) levels from the data-parent
//!   before resolving the rest.
//! - `""`: the store's base entry, or the whole store.
//!
//! ## Dynamic Segments
//!
//! With an injection state present, a segment may be computed:
//!
//! | Segment | Replaced by |
//! |---|---|
//! | `$KEY` | the current key |
//! | `$GET:p$` | the rendered value of `p` resolved against the data |
//! | `$REF:p$` | the rendered value of `p` resolved against the original spec |
//! | `$META:p$` | the rendered value of `p` resolved against the meta map |
//! | `$$` | a literal `$` |
//!
//! A segment that cannot be computed makes the whole lookup resolve to none.

use std::fmt;

use crate::inject::{ZiInjection, S_DSPEC};
use crate::node::{get_prop, str_key, stringify, ZiNode};

const DIRECTIVES: [&str; 3] = ["$GET:", "$REF:", "$META:"];

/// A path as an ordered list of segments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZiPath {
    segments: Vec<String>,
}

impl ZiPath {
    pub fn parse(path: &str) -> Self {
        ZiPath {
            segments: split_path(path),
        }
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        ZiPath { segments }
    }

    /// A string node is parsed, a list node supplies its segments.
    pub fn from_node(node: &ZiNode) -> Option<Self> {
        match node {
            ZiNode::String(s) => Some(ZiPath::parse(s)),
            ZiNode::List(l) => Some(ZiPath::from_segments(
                l.to_vec().iter().map(|p| str_key(Some(p))).collect(),
            )),
            _ => None,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_relative(&self) -> bool {
        self.segments.len() > 1 && self.segments[0].is_empty()
    }
}

impl fmt::Display for ZiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for ZiPath {
    fn from(path: &str) -> Self {
        ZiPath::parse(path)
    }
}

impl From<String> for ZiPath {
    fn from(path: String) -> Self {
        ZiPath::parse(&path)
    }
}

impl From<Vec<String>> for ZiPath {
    fn from(segments: Vec<String>) -> Self {
        ZiPath::from_segments(segments)
    }
}

impl From<&[String]> for ZiPath {
    fn from(segments: &[String]) -> Self {
        ZiPath::from_segments(segments.to_vec())
    }
}

impl From<Vec<&str>> for ZiPath {
    fn from(segments: Vec<&str>) -> Self {
        ZiPath::from_segments(segments.into_iter().map(String::from).collect())
    }
}

fn directive_len(rest: &str) -> Option<usize> {
    DIRECTIVES.iter().find_map(|prefix| {
        let tail = rest.strip_prefix(prefix)?;
        tail.find('$').map(|end| prefix.len() + end + 1)
    })
}

/// Split on `.`, keeping `$GET:..$`, `$REF:..$` and `$META:..$` whole.
pub fn split_path(path: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut cur = String::new();
    let mut rest = path;

    while let Some(c) = rest.chars().next() {
        if cur.is_empty() {
            if let Some(len) = directive_len(rest) {
                cur.push_str(&rest[..len]);
                rest = &rest[len..];
                continue;
            }
        }
        if c == '.' {
            parts.push(std::mem::take(&mut cur));
        } else {
            cur.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    parts.push(cur);
    parts
}

/// Resolve `path` against `store`.
pub fn get_path(path: impl Into<ZiPath>, store: &ZiNode) -> Option<ZiNode> {
    resolve_path(&path.into(), store, None, None)
}

/// Resolve `path` against `store`, with relative paths starting at `current`.
pub fn get_path_from(
    path: impl Into<ZiPath>,
    store: &ZiNode,
    current: Option<&ZiNode>,
) -> Option<ZiNode> {
    resolve_path(&path.into(), store, current, None)
}

/// Resolve with the injection state, then give its handler the result.
///
/// This is how a bare reference to a command gets to run.
pub fn get_path_state(path: &ZiPath, store: &ZiNode, inj: &mut ZiInjection) -> Option<ZiNode> {
    let val = resolve_path(path, store, None, Some(&*inj));
    match inj.handler {
        Some(handler) => {
            let reference = path.to_string();
            handler(inj, val, Some(&reference), store)
        }
        None => val,
    }
}

/// Resolve without invoking any handler.
///
/// The data-parent comes from `inj` when present, else from `current`.
pub fn resolve_path(
    path: &ZiPath,
    store: &ZiNode,
    current: Option<&ZiNode>,
    inj: Option<&ZiInjection>,
) -> Option<ZiNode> {
    let parts = path.segments();
    if parts.is_empty() {
        return Some(store.clone());
    }
    if parts.len() == 1 && parts[0].is_empty() {
        return base_of(store, inj);
    }

    let mut val: Option<ZiNode>;
    let mut pi: usize;

    if parts[0].is_empty() {
        let mut lead = 1;
        while lead < parts.len() && parts[lead].is_empty() {
            lead += 1;
        }
        let mut ascends = lead - 1;
        if lead == parts.len() {
            ascends = ascends.saturating_sub(1);
        }
        pi = lead;

        if ascends == 0 {
            val = match inj {
                Some(i) => i.dparent.clone(),
                None => current.cloned(),
            };
        } else {
            let inj = inj?;
            if ascends > inj.dpath.len() {
                return None;
            }
            val = inj.droot.clone();
            for seg in &inj.dpath[..inj.dpath.len() - ascends] {
                val = val.and_then(|v| get_prop(&v, seg));
            }
        }
    } else {
        let first = &parts[0];
        val = get_prop(store, first);
        if val.is_none() && inj.is_some() {
            let seg = substitute(first, store, inj)?;
            val = base_of(store, inj).and_then(|b| get_prop(&b, &seg));
        }
        pi = 1;
    }

    while pi < parts.len() {
        let Some(cur) = val else {
            return None;
        };
        let seg = substitute(&parts[pi], store, inj)?;
        val = get_prop(&cur, &seg);
        pi += 1;
    }

    val
}

fn base_of(store: &ZiNode, inj: Option<&ZiInjection>) -> Option<ZiNode> {
    match inj {
        Some(i) => get_prop(store, &i.base).or_else(|| Some(store.clone())),
        None => Some(store.clone()),
    }
}

fn directive<'a>(part: &'a str, prefix: &str) -> Option<&'a str> {
    part.strip_prefix(prefix)?.strip_suffix('$')
}

fn substitute(part: &str, store: &ZiNode, inj: Option<&ZiInjection>) -> Option<String> {
    let Some(inj) = inj else {
        return Some(part.to_string());
    };

    if part == "$KEY" {
        return Some(inj.key.clone());
    }

    let (root, sub) = if let Some(sub) = directive(part, "$GET:") {
        (base_of(store, Some(inj)), sub)
    } else if let Some(sub) = directive(part, "$REF:") {
        (get_prop(store, S_DSPEC), sub)
    } else if let Some(sub) = directive(part, "$META:") {
        (Some(ZiNode::Map(inj.meta.clone())), sub)
    } else {
        return Some(part.replace("$$", "$"));
    };

    let found = resolve_path(&ZiPath::parse(sub), &root?, None, None)?;
    log::trace!("dynamic segment {part} -> {found}");
    Some(stringify(Some(&found), None))
}
