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

//! # ZiStruct Walk Module
//!
//! Depth-first, children-before-parent traversal with in-place rewrite.
//!
//! The callback receives `(key, value, parent, path)`. For the root call the
//! key and parent are `None` and the path is empty. Whatever the callback
//! returns for a child is written back into its parent (at the child's
//! original key) before the parent itself is visited; returning `None`
//! deletes the child.

use crate::node::{items, set_prop, ZiNode};

/// Walk `val` post-order, applying `apply` to every value exactly once.
pub fn walk<F>(val: ZiNode, apply: &mut F) -> Option<ZiNode>
where
    F: FnMut(Option<&str>, ZiNode, Option<&ZiNode>, &[String]) -> Option<ZiNode>,
{
    let mut path = Vec::new();
    walk_inner(val, apply, None, None, &mut path)
}

fn walk_inner<F>(
    val: ZiNode,
    apply: &mut F,
    key: Option<&str>,
    parent: Option<&ZiNode>,
    path: &mut Vec<String>,
) -> Option<ZiNode>
where
    F: FnMut(Option<&str>, ZiNode, Option<&ZiNode>, &[String]) -> Option<ZiNode>,
{
    if val.is_node() {
        for (ckey, child) in items(&val) {
            path.push(ckey.clone());
            let out = walk_inner(child, apply, Some(&ckey), Some(&val), path);
            path.pop();
            set_prop(&val, &ckey, out);
        }
    }

    apply(key, val, parent, path.as_slice())
}
