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

//! Engine configuration: where data lives in the store, and how validation
//! messages are rendered.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, ZiError};

pub const DEFAULT_BASE: &str = "$TOP";
pub const DEFAULT_SEPARATOR: &str = " | ";

/// Settings shared by `transform` and `validate`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZiStructConfig {
    /// Store key holding the source data.
    pub base: String,
    /// Maximum rendered length of data values quoted in validation messages.
    pub value_maxlen: Option<usize>,
    /// Separator used when validation messages are aggregated into one error.
    pub separator: String,
}

impl Default for ZiStructConfig {
    fn default() -> Self {
        ZiStructConfig {
            base: DEFAULT_BASE.to_string(),
            value_maxlen: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ZiStructConfig {
    pub fn builder() -> ZiStructConfigBuilder {
        ZiStructConfigBuilder::default()
    }

    /// Parse from a JSON object; missing fields take their defaults.
    pub fn from_json(value: &Value) -> Result<Self> {
        if !value.is_object() {
            return Err(ZiError::validation("config must be a JSON object"));
        }
        let config: ZiStructConfig = serde_json::from_value(value.clone())?;
        config.check()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&text)?;
        Self::from_json(&value)
    }

    fn check(&self) -> Result<()> {
        if self.base.is_empty() {
            return Err(ZiError::validation("config 'base' must not be empty"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZiStructConfigBuilder {
    pub base: Option<String>,
    pub value_maxlen: Option<usize>,
    pub separator: Option<String>,
}

impl ZiStructConfigBuilder {
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn value_maxlen(mut self, maxlen: usize) -> Self {
        self.value_maxlen = Some(maxlen);
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn build(self) -> ZiStructConfig {
        let base = ZiStructConfig::default();
        ZiStructConfig {
            base: self.base.unwrap_or(base.base),
            value_maxlen: self.value_maxlen.or(base.value_maxlen),
            separator: self.separator.unwrap_or(base.separator),
        }
    }
}
