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

//! # Transform Commands
//!
//! | Command | Form | Effect |
//! |---|---|---|
//! | `$DELETE` | value | removes the key |
//! | `$COPY` | value | copies the data value at the same key |
//! | `$KEY` | value | the key this entry came from |
//! | `$META` | key | records the `` `$META` `` marker and removes it |
//! | `$MERGE` | key | merges its argument(s) under the literal siblings |
//! | `$EACH` | `["`$EACH`", path, template]` | one template copy per source item |
//! | `$PACK` | `{"`$PACK`": [path, template]}` | a map of template copies |
//! | `$REF` | `["`$REF`", spec-path]` | injects part of the original spec |
//! | `$BT` `$DS` | value | a literal backtick / dollar sign |
//! | `$WHEN` | value | the current UTC time, RFC 3339 |

use crate::command::ZiCommand;
use crate::inject::{ZiInjectMode, ZiInjection, S_DSPEC, S_DTOP};
use crate::merge::merge;
use crate::node::{get_prop, pathify, set_prop, str_key, ZiMap, ZiNode};
use crate::path::{resolve_path, ZiPath};
use crate::walk::walk;

/// Parent marker naming the data field that supplies the key.
pub const S_BKEY: &str = "`$KEY`";
/// Parent marker carrying per-entry metadata.
pub const S_BMETA: &str = "`$META`";
/// Metadata field holding the source key.
pub const S_KEY: &str = "KEY";
/// Template string of a `$REF` command.
pub const S_BREF: &str = "`$REF`";

fn key_meta(key: &str) -> ZiNode {
    let meta = ZiMap::new();
    meta.insert(S_KEY, ZiNode::from(key));
    ZiNode::Map(meta)
}

fn data_root(data: Option<ZiNode>) -> ZiNode {
    let top = ZiMap::new();
    if let Some(d) = data {
        top.insert(S_DTOP, d);
    }
    ZiNode::Map(top)
}

fn source_of(path: Option<ZiNode>, store: &ZiNode, inj: &ZiInjection) -> Option<ZiNode> {
    let path = ZiPath::from_node(&path?)?;
    resolve_path(&path, store, None, Some(inj))
}

/// `$BT`: a literal backtick.
#[derive(Debug)]
pub struct ZiBacktick;

impl ZiCommand for ZiBacktick {
    fn name(&self) -> &str {
        "$BT"
    }

    fn apply(&self, _inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        Some(ZiNode::from("`"))
    }
}

/// `$DS`: a literal dollar sign.
#[derive(Debug)]
pub struct ZiDollar;

impl ZiCommand for ZiDollar {
    fn name(&self) -> &str {
        "$DS"
    }

    fn apply(&self, _inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        Some(ZiNode::from("$"))
    }
}

/// `$WHEN`: the current time.
#[derive(Debug)]
pub struct ZiWhen;

impl ZiCommand for ZiWhen {
    fn name(&self) -> &str {
        "$WHEN"
    }

    fn apply(&self, _inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        Some(ZiNode::from(chrono::Utc::now().to_rfc3339()))
    }
}

/// `$DELETE`: remove the current key.
#[derive(Debug)]
pub struct ZiDelete;

impl ZiCommand for ZiDelete {
    fn name(&self) -> &str {
        "$DELETE"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        if inj.mode == ZiInjectMode::Val {
            inj.remove_slot();
            inj.detached = true;
        } else {
            inj.set_val(None, 0);
        }
        None
    }
}

/// `$COPY`: the data value at the same key.
#[derive(Debug)]
pub struct ZiCopy;

impl ZiCommand for ZiCopy {
    fn name(&self) -> &str {
        "$COPY"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        if inj.mode.is_key() {
            return Some(ZiNode::from(inj.key.as_str()));
        }
        inj.current()
    }
}

/// `$KEY`: explicit marker, then recorded metadata, then the parent's own key.
#[derive(Debug)]
pub struct ZiKey;

impl ZiCommand for ZiKey {
    fn name(&self) -> &str {
        "$KEY"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        if inj.mode != ZiInjectMode::Val {
            return None;
        }

        let parent = inj.parent.clone();
        if let Some(field) = get_prop(&parent, S_BKEY) {
            set_prop(&parent, S_BKEY, None);
            let field = str_key(Some(&field));
            return inj.dparent.as_ref().and_then(|d| get_prop(d, &field));
        }

        if let Some(key) = get_prop(&parent, S_BMETA).and_then(|m| get_prop(&m, S_KEY)) {
            return Some(key);
        }

        let len = inj.path.len();
        let recorded = inj
            .meta
            .get(&pathify(&inj.path[..len.saturating_sub(1)], 1))
            .and_then(|m| get_prop(&m, S_KEY));
        if recorded.is_some() {
            return recorded;
        }

        len.checked_sub(2)
            .and_then(|i| inj.path.get(i))
            .map(|k| ZiNode::from(k.as_str()))
    }
}

/// `$META`: move the marker into the state's meta map.
#[derive(Debug)]
pub struct ZiMeta;

impl ZiCommand for ZiMeta {
    fn name(&self) -> &str {
        "$META"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, _store: &ZiNode) -> Option<ZiNode> {
        let parent = inj.parent.clone();
        if let Some(meta) = get_prop(&parent, S_BMETA) {
            let len = inj.path.len();
            let owner = pathify(&inj.path[..len.saturating_sub(1)], 1);
            inj.meta.insert(owner, meta);
        }
        set_prop(&parent, S_BMETA, None);
        None
    }
}

/// `$MERGE`: merge the argument(s) into the parent, literal siblings last.
#[derive(Debug)]
pub struct ZiMergeCommand;

impl ZiCommand for ZiMergeCommand {
    fn name(&self) -> &str {
        "$MERGE"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        match inj.mode {
            ZiInjectMode::KeyPre => Some(ZiNode::from(inj.key.as_str())),
            ZiInjectMode::KeyPost => {
                let parent = inj.parent.clone();
                let args = match get_prop(&parent, &inj.key) {
                    Some(ZiNode::String(s)) if s.is_empty() => {
                        get_prop(store, &inj.base).into_iter().collect()
                    }
                    Some(ZiNode::List(l)) => l.to_vec(),
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                set_prop(&parent, &inj.key, None);

                let mut list = Vec::with_capacity(args.len() + 2);
                list.push(parent.clone());
                list.extend(args);
                list.push(parent.deep_clone());
                merge(&list);

                Some(ZiNode::from(inj.key.as_str()))
            }
            ZiInjectMode::Val => None,
        }
    }
}

/// `$EACH`: replace the enclosing list with one injected template per item.
#[derive(Debug)]
pub struct ZiEach;

impl ZiCommand for ZiEach {
    fn name(&self) -> &str {
        "$EACH"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        inj.keys.truncate(1);
        if inj.mode != ZiInjectMode::Val {
            return None;
        }
        let (target, tkey) = inj.ancestor(2)?;

        let parent = inj.parent.clone();
        let template = get_prop(&parent, "2").unwrap_or(ZiNode::Null);
        let src = source_of(get_prop(&parent, "1"), store, inj);

        let mut tval = Vec::new();
        let mut tcur = Vec::new();
        match &src {
            Some(ZiNode::List(items)) => {
                for item in items.to_vec() {
                    tval.push(template.deep_clone());
                    tcur.push(item);
                }
            }
            Some(ZiNode::Map(entries)) => {
                for (k, v) in entries.entries() {
                    let child = template.deep_clone();
                    set_prop(&child, S_BMETA, Some(key_meta(&k)));
                    tval.push(child);
                    tcur.push(v);
                }
            }
            _ => {}
        }
        log::trace!("$EACH at {} over {} item(s)", tkey, tval.len());

        let out = inj.inject_nested(
            ZiNode::list(tval),
            store,
            data_root(Some(ZiNode::list(tcur))),
        );
        set_prop(&target, &tkey, out.clone());
        inj.detached = true;
        out.and_then(|o| get_prop(&o, "0"))
    }
}

/// `$PACK`: replace the enclosing map with template copies keyed per item.
///
/// The key of each copy is the element's value for the template's
/// `` `$KEY` `` field. Without one, map sources use the map key and list
/// sources use the element index, so no element is skipped.
#[derive(Debug)]
pub struct ZiPack;

impl ZiCommand for ZiPack {
    fn name(&self) -> &str {
        "$PACK"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        if inj.mode != ZiInjectMode::KeyPre {
            return None;
        }
        let parent = inj.parent.clone();
        let Some(ZiNode::List(args)) = get_prop(&parent, &inj.key) else {
            return None;
        };
        let (target, tkey) = inj.ancestor(2)?;

        let template = args.get(1).map(|t| t.deep_clone()).unwrap_or_else(ZiNode::new_map);
        let keyfield = get_prop(&template, S_BKEY).map(|k| str_key(Some(&k)));
        set_prop(&template, S_BKEY, None);

        let (from_map, elems): (bool, Vec<(String, ZiNode)>) =
            match source_of(args.get(0), store, inj) {
                Some(ZiNode::List(items)) => (
                    false,
                    items
                        .to_vec()
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v))
                        .collect(),
                ),
                Some(ZiNode::Map(entries)) => (
                    true,
                    entries.entries().into_iter().filter(|(_, v)| v.is_map()).collect(),
                ),
                _ => return None,
            };

        let tval = ZiMap::new();
        let tcur = ZiMap::new();
        for (fallback, elem) in elems {
            let named = keyfield
                .as_deref()
                .and_then(|f| get_prop(&elem, f))
                .map(|k| str_key(Some(&k)))
                .filter(|k| !k.is_empty());
            let kn = named.unwrap_or(fallback);
            let child = template.deep_clone();
            if from_map {
                set_prop(&child, S_BMETA, Some(key_meta(&kn)));
            }
            tval.insert(kn.clone(), child);
            tcur.insert(kn, elem);
        }
        log::trace!("$PACK at {} into {} key(s)", tkey, tval.len());

        let out = inj.inject_nested(ZiNode::Map(tval), store, data_root(Some(ZiNode::Map(tcur))));
        set_prop(&target, &tkey, out);
        inj.key_i = inj.keys.len();
        None
    }
}

/// `$REF`: inject a copy of part of the original spec in place.
#[derive(Debug)]
pub struct ZiRef;

fn contains_ref(node: &ZiNode) -> bool {
    let mut found = false;
    walk(node.deep_clone(), &mut |_key, val, _parent, _path| {
        if val.as_str() == Some(S_BREF) {
            found = true;
        }
        Some(val)
    });
    found
}

impl ZiCommand for ZiRef {
    fn name(&self) -> &str {
        "$REF"
    }

    fn apply(&self, inj: &mut ZiInjection, _val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        if inj.mode != ZiInjectMode::Val {
            return None;
        }
        inj.key_i = inj.keys.len();

        let refpath = get_prop(&inj.parent, "1").and_then(|p| ZiPath::from_node(&p));
        let spec = get_prop(store, S_DSPEC);
        let found = match (refpath, spec) {
            (Some(p), Some(s)) => resolve_path(&p, &s, None, None),
            _ => None,
        };

        let current = inj.dparent.clone();
        let out = match found {
            Some(r) if !(contains_ref(&r) && current.is_none()) => {
                inj.inject_nested(r.deep_clone(), store, data_root(current))
            }
            _ => None,
        };

        inj.set_val(out.clone(), 2);
        inj.detached = true;
        out
    }
}
