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

//! # Commands Module
//!
//! Built-in store commands, grouped by the entry point that installs them.
//!
//! - **transform**: `$DELETE $COPY $KEY $META $MERGE $EACH $PACK $REF`, plus
//!   the literal helpers `$BT $DS $WHEN`
//! - **validate**: `$STRING $NUMBER $BOOLEAN $OBJECT $ARRAY $FUNCTION $ANY`,
//!   `$OPEN $CHILD $ONE $EXACT`, and the generic shape check run after each value

pub mod transform;
pub mod validate;

use crate::command::ZiCommandTable;

/// Commands installed by `transform`.
pub fn transform_table() -> ZiCommandTable {
    let mut table = ZiCommandTable::new();
    table.register(transform::ZiBacktick);
    table.register(transform::ZiDollar);
    table.register(transform::ZiWhen);
    table.register(transform::ZiDelete);
    table.register(transform::ZiCopy);
    table.register(transform::ZiKey);
    table.register(transform::ZiMeta);
    table.register(transform::ZiMergeCommand);
    table.register(transform::ZiEach);
    table.register(transform::ZiPack);
    table.register(transform::ZiRef);
    table
}

/// Names of the transform commands that validation switches off.
pub const TRANSFORM_ONLY: [&str; 11] = [
    "$DELETE", "$COPY", "$KEY", "$META", "$MERGE", "$EACH", "$PACK", "$REF", "$BT", "$DS",
    "$WHEN",
];

/// Validators installed by `validate`.
pub fn validate_table() -> ZiCommandTable {
    use validate::ZiTypeCheck;

    let mut table = ZiCommandTable::new();
    table.register(ZiTypeCheck::string());
    table.register(ZiTypeCheck::number());
    table.register(ZiTypeCheck::boolean());
    table.register(ZiTypeCheck::object());
    table.register(ZiTypeCheck::array());
    table.register(ZiTypeCheck::function());
    table.register(validate::ZiAny);
    table.register(validate::ZiOpen);
    table.register(validate::ZiChild);
    table.register(validate::ZiOne);
    table.register(validate::ZiExact);
    table
}
