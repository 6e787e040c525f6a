//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Rafiq.
//! The Rafiq project belongs to the Dunimd Team.
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

use std::fs;

use rafiq::config::RfConfig;
use rafiq::record::RfManagedKey;
use rafiq::RfError;
use tempfile::tempdir;

#[test]
fn partial_json_falls_back_to_defaults() {
    let config = RfConfig::from_json_str(r#"{"backup_capacity": 3, "file_prefix": "School_Export"}"#)
        .expect("valid config");
    assert_eq!(config.backup_capacity, 3);
    assert_eq!(config.file_prefix, "School_Export");
    assert_eq!(config.backup_key, "backup_history");
    assert_eq!(config.managed_keys.len(), 14);
}

#[test]
fn loads_by_file_extension() {
    let dir = tempdir().expect("tempdir");

    let json_path = dir.path().join("rafiq.json");
    fs::write(&json_path, r#"{"format_version": "2.1"}"#).unwrap();
    assert_eq!(RfConfig::from_path(&json_path).unwrap().format_version, "2.1");

    let yaml_path = dir.path().join("rafiq.yaml");
    fs::write(
        &yaml_path,
        "dedup_teachers_by_name: true\nmanaged_keys:\n  - name: teachers\n    shape: collection\n  - name: hiddenCriteria\n    shape: config\n",
    )
    .unwrap();
    let yaml = RfConfig::from_path(&yaml_path).unwrap();
    assert!(yaml.dedup_teachers_by_name);
    assert_eq!(yaml.managed_key_names(), vec!["teachers", "hiddenCriteria"]);

    let toml_path = dir.path().join("rafiq.toml");
    fs::write(&toml_path, "x = 1").unwrap();
    assert!(matches!(
        RfConfig::from_path(&toml_path).unwrap_err(),
        RfError::Validation { .. }
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempdir().expect("tempdir");
    let err = RfConfig::from_path(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, RfError::Io(_)));
}

#[test]
fn validation_rejects_unusable_settings() {
    let cases = vec![
        RfConfig::default().backup_capacity(0),
        RfConfig::default().file_prefix("  "),
        RfConfig::default().managed_keys(vec![
            RfManagedKey::collection("teachers"),
            RfManagedKey::collection("teachers"),
        ]),
        RfConfig::default().managed_keys(vec![RfManagedKey::collection("")]),
        RfConfig {
            backup_key: "history".to_string(),
            ..RfConfig::default()
        },
    ];
    for config in cases {
        assert!(
            matches!(config.validate(), Err(RfError::Validation { .. })),
            "{config:?}"
        );
    }
}

#[test]
fn reserved_prefix_covers_the_history_key() {
    let config = RfConfig::new();
    assert!(config.is_reserved("backup_history"));
    assert!(config.is_reserved("backup_anything"));
    assert!(!config.is_reserved("teachers"));
    assert!(config.is_managed("syllabusPlans"));
    assert!(!config.is_managed("selectedSchool"));
}
