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

//! # ZiStruct Transform Module
//!
//! `transform(data, spec, extra)` builds the output by example: `spec` is
//! deep-cloned and injected against a store holding the data and the
//! transform commands.
//!
//! ## Extra Entries
//!
//! - keys without `$` are data, merged underneath `data`;
//! - `$NAME` keys holding a command bind (or rebind) that command;
//! - `$NAME` keys holding `null` unbind that command;
//! - other `$NAME` keys are stored as literal helper values.

use std::rc::Rc;

use crate::commands::transform_table;
use crate::config::ZiStructConfig;
use crate::inject::{inject_with, ZiModify, S_DDATA, S_DSPEC, S_DTOP};
use crate::merge::merge;
use crate::node::{items, ZiMap, ZiNode};

/// Transform `data` by example with default settings.
pub fn transform(data: &ZiNode, spec: &ZiNode, extra: Option<&ZiNode>) -> Option<ZiNode> {
    transform_with(Some(data), spec, extra, None, &ZiStructConfig::default())
}

/// Transform with an optional per-value `modify` callback.
///
/// Neither `data` nor `spec` is mutated.
pub fn transform_with(
    data: Option<&ZiNode>,
    spec: &ZiNode,
    extra: Option<&ZiNode>,
    modify: Option<ZiModify>,
    config: &ZiStructConfig,
) -> Option<ZiNode> {
    let spec = spec.deep_clone();

    let mut table = transform_table();
    let helpers = ZiMap::new();
    let extra_data = ZiMap::new();
    for (key, val) in extra.map(items).unwrap_or_default() {
        if !key.starts_with('$') {
            extra_data.insert(key, val.deep_clone());
            continue;
        }
        match val {
            ZiNode::Command(command) => table.register_as(&key, command),
            ZiNode::Null => table.disable(&key),
            other => helpers.insert(key, other),
        }
    }

    let data = match data {
        Some(d) if extra_data.is_empty() => Some(d.deep_clone()),
        Some(d) => merge(&[ZiNode::Map(extra_data), d.deep_clone()]),
        None if extra_data.is_empty() => None,
        None => Some(ZiNode::Map(extra_data)),
    };

    let store = ZiMap::new();
    for (key, val) in helpers.entries() {
        store.insert(key, val);
    }
    if let Some(d) = &data {
        store.insert(config.base.clone(), d.clone());
        store.insert(S_DDATA, d.clone());
    }
    store.insert(S_DSPEC, spec.deep_clone());
    table.install(&store);
    log::debug!(
        "transform: {} command(s) bound, data under {}",
        table.names().len(),
        config.base
    );

    let current = ZiMap::new();
    if let Some(d) = data {
        current.insert(S_DTOP, d);
    }

    inject_with(
        spec,
        &ZiNode::Map(store),
        modify,
        Some(ZiNode::Map(current)),
        Rc::new(config.clone()),
    )
}
