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

//! # ZiStruct Command Module
//!
//! This module defines the command trait and the command table used by the
//! injection engine. Commands are the callables stored under `$NAME` keys in
//! the store; a backtick reference such as `` `$COPY` `` that resolves to a
//! command invokes it instead of splicing it in as data.
//!
//! ## Implementing Custom Commands
//!
//! Any type implementing [`ZiCommand`] can be placed in the store, either
//! through a [`ZiCommandTable`] or by passing it in the `extra` argument of
//! `transform`/`validate`. Closures can be wrapped with [`ZiFnCommand`].
//!
//! ```rust
//! use zistruct::command::ZiFnCommand;
//! use zistruct::node::ZiNode;
//!
//! let upper = ZiFnCommand::node("$UPPER", |inj, _val, _store| {
//!     let key = inj.key.clone();
//!     inj.dparent
//!         .as_ref()
//!         .and_then(|d| d.get(&key))
//!         .and_then(|v| v.as_str().map(|s| ZiNode::from(s.to_uppercase())))
//! });
//! ```
//!
//! ## Command Contract
//!
//! A command receives the current injection state and may:
//!
//! - return a replacement value for the reference that named it;
//! - write into its parent (`set_val(v, 0)`) or an ancestor (`set_val(v, n)`);
//! - change the sibling iteration through `keys`, `key_i` and `step`;
//! - mark the state `detached` once it has written its result itself.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::inject::ZiInjection;
use crate::node::{ZiMap, ZiNode};

/// Contract every store command fulfils.
pub trait ZiCommand: fmt::Debug {
    /// Store key the command is registered under, including the `$` sigil.
    fn name(&self) -> &str;

    /// Run the command at the current injection position.
    fn apply(&self, inj: &mut ZiInjection, val: Option<ZiNode>, store: &ZiNode)
        -> Option<ZiNode>;
}

/// Signature of closure-backed commands.
pub type ZiCommandFn = dyn Fn(&mut ZiInjection, Option<ZiNode>, &ZiNode) -> Option<ZiNode>;

/// A command backed by a closure.
pub struct ZiFnCommand {
    name: String,
    func: Box<ZiCommandFn>,
}

impl ZiFnCommand {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut ZiInjection, Option<ZiNode>, &ZiNode) -> Option<ZiNode> + 'static,
    {
        ZiFnCommand {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// Wrap the closure straight into a store value.
    pub fn node<F>(name: impl Into<String>, func: F) -> ZiNode
    where
        F: Fn(&mut ZiInjection, Option<ZiNode>, &ZiNode) -> Option<ZiNode> + 'static,
    {
        ZiNode::command(ZiFnCommand::new(name, func))
    }
}

impl fmt::Debug for ZiFnCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZiFnCommand")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl ZiCommand for ZiFnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, inj: &mut ZiInjection, val: Option<ZiNode>, store: &ZiNode) -> Option<ZiNode> {
        (self.func)(inj, val, store)
    }
}

/// Registry mapping `$NAME` keys to commands.
///
/// A `None` entry marks a command as disabled: installing the table removes
/// that key from the store instead of binding it.
#[derive(Clone, Debug, Default)]
pub struct ZiCommandTable {
    inner: BTreeMap<String, Option<Rc<dyn ZiCommand>>>,
}

impl ZiCommandTable {
    pub fn new() -> Self {
        ZiCommandTable::default()
    }

    /// Register a command under its own name.
    pub fn register<C: ZiCommand + 'static>(&mut self, command: C) {
        let name = command.name().to_string();
        self.inner.insert(name, Some(Rc::new(command)));
    }

    /// Register a shared command under an explicit key.
    pub fn register_as(&mut self, name: &str, command: Rc<dyn ZiCommand>) {
        self.inner.insert(name.to_string(), Some(command));
    }

    /// Disable a command so the store does not carry it.
    pub fn disable(&mut self, name: &str) {
        self.inner.insert(name.to_string(), None);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn ZiCommand>> {
        self.inner.get(name).cloned().flatten()
    }

    /// Names of the enabled commands, sorted.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .iter()
            .filter(|(_, c)| c.is_some())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Layer `other` over this table; its disabled entries disable ours.
    pub fn extend(&mut self, other: &ZiCommandTable) {
        for (name, command) in &other.inner {
            self.inner.insert(name.clone(), command.clone());
        }
    }

    /// Bind every enabled command into `store` and drop disabled ones.
    pub fn install(&self, store: &ZiMap) {
        for (name, command) in &self.inner {
            match command {
                Some(c) => store.insert(name.clone(), ZiNode::Command(c.clone())),
                None => {
                    store.remove(name);
                }
            }
        }
    }
}
