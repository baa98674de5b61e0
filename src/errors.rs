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

//! # ZiStruct Error Module
//!
//! This module defines the error types used throughout ZiStruct.
//!
//! ## Two Kinds of Failure
//!
//! - [`ZiError`] is returned from fallible entry points (`validate`, config
//!   loading, the command-line wrapper). The engine itself is tolerant of
//!   missing data: `transform`, `inject`, `merge` and `get_path` never fail.
//! - [`ZiViolation`] describes a single shape violation found while
//!   validating. Violations are collected into a shared error list rather
//!   than returned, so one validation pass reports every problem at once.
//!
//! ## Usage
//!
//! ```rust
//! use zistruct::errors::{Result, ZiError};
//!
//! fn load(text: &str) -> Result<serde_json::Value> {
//!     Ok(serde_json::from_str(text)?)
//! }
//! ```

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout ZiStruct.
pub type Result<T> = std::result::Result<T, ZiError>;

/// Canonical error enumeration for ZiStruct.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ZiError {
    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Data failed validation against a shape.
    #[error("{message}")]
    Validation { message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<io::Error> for ZiError {
    fn from(err: io::Error) -> Self {
        ZiError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ZiError {
    fn from(err: serde_json::Error) -> Self {
        ZiError::Serde(err.to_string())
    }
}

impl ZiError {
    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        ZiError::Validation {
            message: message.into(),
        }
    }

    /// Aggregate collected validation messages into one error.
    pub fn invalid_data<S: AsRef<str>>(messages: &[S], separator: &str) -> Self {
        let joined = messages
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<_>>()
            .join(separator);
        ZiError::validation(format!("Invalid data: {joined}"))
    }
}

/// A single shape violation found during validation.
///
/// The `Display` output is the message pushed onto the error list.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZiViolation {
    /// The data has the wrong type, or is missing where a value is required.
    ///
    /// `field` is the pathified location (`None` at the root), `found` is
    /// the data's type and rendering, or `None` when there is no value.
    #[error("Expected {}{expected}, but found {}.", field_prefix(.field), found_text(.found))]
    TypeMismatch {
        field: Option<String>,
        expected: String,
        found: Option<(String, String)>,
    },

    /// A required string was present but empty.
    #[error("Empty string at {field}")]
    EmptyString { field: String },

    /// A closed map received keys its shape does not declare.
    #[error("Unexpected keys at field {field}: {}", .keys.join(", "))]
    UnexpectedKeys { field: String, keys: Vec<String> },

    /// None of the `$EXACT` alternatives equalled the data.
    #[error("Expected {}exactly equal to {}, but found {}.", field_prefix(.field), choice_text(.choices), found_text(.found))]
    NotExact {
        field: Option<String>,
        choices: Vec<String>,
        found: Option<(String, String)>,
    },

    /// A command was used somewhere it cannot work.
    #[error("{0}")]
    Malformed(String),
}

fn field_prefix(field: &Option<String>) -> String {
    match field {
        Some(f) => format!("field {f} to be "),
        None => String::new(),
    }
}

fn choice_text(choices: &[String]) -> String {
    if choices.len() > 1 {
        format!("one of {}", choices.join(", "))
    } else {
        choices.join(", ")
    }
}

fn found_text(found: &Option<(String, String)>) -> String {
    match found {
        Some((kind, text)) => format!("{kind}: {text}"),
        None => "no value".to_string(),
    }
}
