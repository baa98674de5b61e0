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

//! # ZiStruct Merge Module
//!
//! Precedence merge of a sequence of values.
//!
//! ## Rules
//!
//! - Later values win.
//! - A scalar always replaces whatever came before it.
//! - A container replaces a scalar, and a list replaces a map (and the other
//!   way around): kinds are never blended.
//! - Two containers of the same kind merge field by field, recursively.
//!
//! The first element is modified in place and returned when it survives.

use crate::node::{is_empty, set_prop, ZiNode};
use crate::path::get_path;
use crate::walk::walk;

/// Merge `objs` left to right. Empty input gives `None`.
pub fn merge(objs: &[ZiNode]) -> Option<ZiNode> {
    let (first, rest) = objs.split_first()?;
    let mut out = first.clone();

    for obj in rest {
        if !obj.is_node() || !out.is_node() || !out.same_kind(obj) {
            out = obj.clone();
            continue;
        }
        merge_into(&out, obj);
    }

    Some(out)
}

fn merge_into(out: &ZiNode, obj: &ZiNode) {
    // cur[i] is the container in `out` matching depth i of the walk over `obj`.
    let mut cur: Vec<Option<ZiNode>> = vec![Some(out.clone())];

    walk(obj.clone(), &mut |key, val, parent, path| {
        let Some(key) = key else {
            return Some(val);
        };

        let ci = path.len() - 1;
        if cur.len() < ci + 2 {
            cur.resize(ci + 2, None);
        }

        let like = parent.map(ZiNode::empty_like).unwrap_or_else(ZiNode::new_map);
        let target = match cur[ci].take() {
            Some(t) => t,
            None => match get_path(&path[..ci], out) {
                Some(found) if found.same_kind(&like) => found,
                _ => like,
            },
        };

        if val.is_node() && !is_empty(Some(&val)) {
            set_prop(&target, key, cur[ci + 1].take());
        } else {
            set_prop(&target, key, Some(val.clone()));
        }

        cur[ci] = Some(target);
        Some(val)
    });
}
