//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of ZiStruct.
//! The ZiStruct project belongs to the Dunimd Team.

use std::io::Write;

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::NamedTempFile;
use zistruct::{ZiError, ZiStructConfig};

#[test]
fn test_config_defaults() {
    let config = ZiStructConfig::default();
    assert_eq!(config.base, "$TOP");
    assert_eq!(config.value_maxlen, None);
    assert_eq!(config.separator, " | ");
}

#[test]
fn test_config_builder() {
    let config = ZiStructConfig::builder().base("data").value_maxlen(10).build();
    assert_eq!(config.base, "data");
    assert_eq!(config.value_maxlen, Some(10));
    assert_eq!(config.separator, " | ");
}

#[test]
fn test_config_from_json_partial() {
    let config = ZiStructConfig::from_json(&json!({"separator": "\n"})).unwrap();
    assert_eq!(config, ZiStructConfig::builder().separator("\n").build());
}

#[test]
fn test_config_rejects_bad_input() {
    assert!(matches!(
        ZiStructConfig::from_json(&json!([1])),
        Err(ZiError::Validation { .. })
    ));
    assert!(matches!(
        ZiStructConfig::from_json(&json!({"base": ""})),
        Err(ZiError::Validation { .. })
    ));
    assert!(matches!(
        ZiStructConfig::from_json(&json!({"value_maxlen": "long"})),
        Err(ZiError::Serde(_))
    ));
}

#[test]
fn test_config_from_path() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"{{"base": "src", "value_maxlen": 20}}"#).unwrap();

    let config = ZiStructConfig::from_path(file.path()).unwrap();
    assert_eq!(config.base, "src");
    assert_eq!(config.value_maxlen, Some(20));
}

#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    assert!(matches!(ZiStructConfig::from_path(&missing), Err(ZiError::Io(_))));
}
