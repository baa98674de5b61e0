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


//! # ZiStruct Core Library
//!
//! ZiStruct transforms and validates JSON-like trees by example. A spec
//! looks like the output it describes; backtick references inside it are
//! resolved against a store, and `$NAME` commands found along the way run
//! in place.
//!
//! ## Module Overview
//!
//! - **node**: `ZiNode`, the tagged tree value, plus property helpers
//! - **walk**: post-order traversal with in-place rewrite
//! - **path**: `get_path` and friends, with relative and dynamic segments
//! - **merge**: precedence merge of a sequence of nodes
//! - **inject**: the three-phase injection engine and its state
//! - **command**: the `ZiCommand` trait and command tables
//! - **commands**: the built-in transform and validation commands
//! - **transform**: `transform(data, spec, extra)`
//! - **validate**: `validate(data, spec)` and the error-collecting variant
//! - **config**: `ZiStructConfig`
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use zistruct::{transform, validate, ZiNode};
//!
//! let data = ZiNode::from(json!({"items": [{"v": 1}, {"v": 2}]}));
//! let spec = ZiNode::from(json!({"x": ["`$EACH`", "items", {"v": "`$COPY`"}]}));
//! let out = transform(&data, &spec, None).unwrap();
//! assert_eq!(out.to_value(), json!({"x": [{"v": 1}, {"v": 2}]}));
//!
//! let shape = ZiNode::from(json!({"name": "`$STRING`", "age": 0}));
//! assert!(validate(&ZiNode::from(json!({"name": "a", "age": 3})), &shape).is_ok());
//! ```
//!
//! ## Error Handling
//!
//! `transform`, `inject`, `merge` and `get_path` never fail: missing data
//! resolves to nothing and nothing deletes the destination key.
//! `validate` returns `Result<T, ZiError>` and reports every violation at
//! once.

pub mod command;
pub mod commands;
pub mod config;
pub mod errors;
pub mod inject;
pub mod merge;
pub mod node;
pub mod path;
pub mod transform;
pub mod validate;
pub mod walk;

pub use command::{ZiCommand, ZiCommandTable, ZiFnCommand};
pub use config::{ZiStructConfig, ZiStructConfigBuilder};
pub use errors::{Result, ZiError, ZiViolation};
pub use inject::{inject, inject_with, ZiInjectMode, ZiInjectStep, ZiInjection, ZiModify};
pub use merge::merge;
pub use node::{
    clone, get_prop, get_prop_or, has_key, is_empty, items, keys_of, pathify, set_prop, stringify,
    typify, ZiList, ZiMap, ZiNode,
};
pub use path::{get_path, get_path_from, resolve_path, ZiPath};
pub use transform::{transform, transform_with};
pub use validate::{validate, validate_collect, validate_with};
pub use walk::walk;
