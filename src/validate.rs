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


//! # ZiStruct Validate Module
//!
//! Shape validation is a transform with the transform commands unbound,
//! the validators bound in their place, and a shape check after every
//! value.
//!
//! Plain spec values are defaults that also fix the type: `{"a": 1}`
//! accepts `{"a": 2}`, fills in `{"a": 1}` for `{}`, and rejects
//! `{"a": "x"}`. An empty map accepts any keys; a non-empty map rejects
//! keys it does not name unless it carries `` `$OPEN`: true ``.

use crate::commands::{validate_table, TRANSFORM_ONLY};
use crate::commands::validate::validation_modify;
use crate::config::ZiStructConfig;
use crate::errors::{Result, ZiError};
use crate::inject::S_DERRS;
use crate::node::{items, stringify, ZiList, ZiMap, ZiNode};
use crate::transform::transform_with;

/// Validate `data` against `spec` with default settings.
///
/// Every violation is collected; if there are any the call fails with all
/// of them in one message.
pub fn validate(data: &ZiNode, spec: &ZiNode) -> Result<ZiNode> {
    validate_with(data, spec, None, &ZiStructConfig::default())
}

/// Validate with extra commands or helper values and explicit settings.
pub fn validate_with(
    data: &ZiNode,
    spec: &ZiNode,
    extra: Option<&ZiNode>,
    config: &ZiStructConfig,
) -> Result<ZiNode> {
    let errs = ZiList::new();
    let out = validate_collect(Some(data.clone()), spec, extra, &errs, config);

    if !errs.is_empty() {
        let messages: Vec<String> = errs
            .to_vec()
            .iter()
            .map(|e| stringify(Some(e), None))
            .collect();
        log::debug!("validation failed with {} error(s)", messages.len());
        return Err(ZiError::invalid_data(messages.as_slice(), &config.separator));
    }
    Ok(out.unwrap_or(ZiNode::Null))
}

/// Validate into a caller-owned error list and never fail.
///
/// The best-effort output is returned; violations are appended to `errs`.
pub fn validate_collect(
    data: Option<ZiNode>,
    spec: &ZiNode,
    extra: Option<&ZiNode>,
    errs: &ZiList,
    config: &ZiStructConfig,
) -> Option<ZiNode> {
    let store_extra = ZiMap::new();
    store_extra.insert(S_DERRS, ZiNode::List(errs.clone()));
    for name in TRANSFORM_ONLY {
        store_extra.insert(name, ZiNode::Null);
    }
    validate_table().install(&store_extra);
    for (key, val) in extra.map(items).unwrap_or_default() {
        store_extra.insert(key, val);
    }

    transform_with(
        data.as_ref(),
        spec,
        Some(&ZiNode::Map(store_extra)),
        Some(validation_modify()),
        config,
    )
}
