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

use rafiq::store::{RfFilePersistOptions, RfFileStorage, RfMemoryStorage, RfStorage, RfStore};
use rafiq::RfError;
use serde_json::json;
use tempfile::tempdir;

#[test]
fn sentinel_texts_read_as_absent() {
    let store = RfStore::new(RfMemoryStorage::from_pairs([
        ("a", ""),
        ("b", "undefined"),
        ("c", "null"),
        ("d", "  "),
    ]));
    for key in ["a", "b", "c", "d", "missing"] {
        assert_eq!(store.get(key).unwrap(), None, "key {key}");
        assert!(!store.contains(key).unwrap());
    }
}

#[test]
fn undecodable_text_reads_as_string() {
    let store = RfStore::new(RfMemoryStorage::from_pairs([("theme", "dark mode")]));
    assert_eq!(store.get("theme").unwrap(), Some(json!("dark mode")));
}

#[test]
fn set_overwrites_with_json_text() {
    let mut store = RfStore::new(RfMemoryStorage::new());
    store.set("teachers", &json!([{"id": "t1"}])).unwrap();
    store.set("teachers", &json!([{"id": "t2"}])).unwrap();
    assert_eq!(
        store.backend().entries()["teachers"],
        r#"[{"id":"t2"}]"#.to_string()
    );
    store.remove("teachers").unwrap();
    store.remove("teachers").unwrap();
    assert!(store.keys().unwrap().is_empty());
}

#[test]
fn boxed_backends_are_storage() {
    let backend: Box<dyn RfStorage> = Box::new(RfMemoryStorage::new());
    let mut store = RfStore::new(backend);
    store.set("tasks", &json!([])).unwrap();
    assert_eq!(store.keys().unwrap(), vec!["tasks".to_string()]);
}

#[test]
fn file_storage_survives_reopen() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("store.json");

    let mut store = RfStore::new(RfFileStorage::open(&path).expect("open new file"));
    store.set("schools", &json!([{"id": "s1", "name": "X"}])).unwrap();
    store.set("selectedSchool", &json!("X")).unwrap();
    store.remove("selectedSchool").unwrap();
    drop(store);

    let reopened = RfStore::new(RfFileStorage::open(&path).expect("reopen"));
    assert_eq!(
        reopened.get("schools").unwrap(),
        Some(json!([{"id": "s1", "name": "X"}]))
    );
    assert_eq!(reopened.keys().unwrap(), vec!["schools".to_string()]);

    let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind");
}

#[test]
fn pretty_non_atomic_file_is_readable_json() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    let options = RfFilePersistOptions {
        pretty: true,
        atomic: false,
        create_directories: false,
    };
    let mut backend = RfFileStorage::open_with_options(&path, options).unwrap();
    backend.set_raw("k", "1".to_string()).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains('\n'));
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, json!({"k": "1"}));
}

#[test]
fn corrupt_storage_file_is_a_storage_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("store.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    let err = RfFileStorage::open(&path).unwrap_err();
    assert!(matches!(err, RfError::Storage { .. }), "{err:?}");
}

#[test]
fn failed_persist_rolls_back_the_entry() {
    let dir = tempdir().expect("tempdir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let mut backend = RfFileStorage::open(blocker.join("store.json")).unwrap();
    let err = backend.set_raw("teachers", "[]".to_string()).unwrap_err();
    assert!(matches!(err, RfError::Storage { .. }), "{err:?}");
    assert_eq!(backend.get_raw("teachers").unwrap(), None);
}
