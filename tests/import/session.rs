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

use rafiq::store::{RfMemoryStorage, RfStorage};
use rafiq::{RfError, RfImportState, RfImportStrategy, RfInterchange, Result};
use serde_json::json;
use tempfile::tempdir;

/// Memory backend that records writes and can refuse writes to one key.
#[derive(Debug, Default)]
struct RecordingStorage {
    inner: RfMemoryStorage,
    writes: Vec<String>,
    refuse: Option<String>,
}

impl RecordingStorage {
    fn refusing(key: &str) -> Self {
        Self {
            refuse: Some(key.to_string()),
            ..Default::default()
        }
    }
}

impl RfStorage for RecordingStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<()> {
        if self.refuse.as_deref() == Some(key) {
            return Err(RfError::storage(format!("quota exceeded writing '{key}'")));
        }
        self.writes.push(format!("set:{key}"));
        self.inner.set_raw(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.writes.push(format!("remove:{key}"));
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

const WRAPPED: &[u8] =
    br#"{"sourceUser":"Huda","timestamp":1700000000000,"payload":{"teachers":[{"id":"t2"}]}}"#;

#[test]
fn malformed_file_changes_nothing() {
    let mut rafiq = RfInterchange::new(RecordingStorage::default());
    rafiq.store_mut().set("teachers", &json!([{"id": "t1"}])).unwrap();
    let writes_before = rafiq.store().backend().writes.len();

    let err = rafiq.begin_import(b"not json").unwrap_err();
    assert!(matches!(err, RfError::ImportParse { .. }));
    assert_eq!(rafiq.state(), RfImportState::Failed);

    assert!(rafiq.confirm_import(RfImportStrategy::Append).is_err());
    assert_eq!(rafiq.store().backend().writes.len(), writes_before);
    assert_eq!(rafiq.store().get("teachers").unwrap(), Some(json!([{"id": "t1"}])));
    assert!(rafiq.backup_history().unwrap().is_empty());
}

#[test]
fn backup_is_written_before_any_collection() {
    for strategy in [RfImportStrategy::Append, RfImportStrategy::Replace] {
        let mut rafiq = RfInterchange::new(RecordingStorage::default());
        rafiq.begin_import(WRAPPED).unwrap();
        rafiq.confirm_import(strategy).unwrap();

        let writes = &rafiq.store().backend().writes;
        assert_eq!(writes.first().map(String::as_str), Some("set:backup_history"), "{strategy}");
        assert!(writes.iter().any(|w| w == "set:teachers"));
    }
}

#[test]
fn failed_backup_aborts_before_mutation_and_can_be_retried() {
    let mut rafiq = RfInterchange::new(RecordingStorage::refusing("backup_history"));
    rafiq.begin_import(WRAPPED).unwrap();

    let err = rafiq.confirm_import(RfImportStrategy::Replace).unwrap_err();
    assert!(matches!(err, RfError::Backup { .. }), "{err:?}");
    assert_eq!(rafiq.state(), RfImportState::Failed);
    assert!(rafiq.store().backend().writes.is_empty());
    assert!(rafiq.pending_preview().is_some());

    rafiq.store_mut().backend_mut().refuse = None;
    let report = rafiq.confirm_import(RfImportStrategy::Replace).unwrap();
    assert_eq!(report.total_added(), 1);
    assert_eq!(rafiq.state(), RfImportState::Success);
}

#[test]
fn failed_write_reports_the_backup_to_restore() {
    let mut rafiq = RfInterchange::new(RecordingStorage::refusing("teachers"));
    rafiq.begin_import(WRAPPED).unwrap();

    let backup_id = match rafiq.confirm_import(RfImportStrategy::Append) {
        Err(RfError::ImportWrite { backup_id, .. }) => backup_id,
        other => panic!("expected an import write error, got {other:?}"),
    };
    let history = rafiq.backup_history().unwrap();
    assert_eq!(history.last().map(|b| b.id.clone()), Some(backup_id));
    assert_eq!(rafiq.state(), RfImportState::Failed);
    assert!(rafiq.pending_preview().is_none());
}

#[test]
fn cancel_discards_the_parsed_file() {
    let mut rafiq = RfInterchange::new(RfMemoryStorage::new());
    let preview = rafiq.begin_import(WRAPPED).unwrap();
    assert_eq!(preview.source_user, "Huda");
    assert!(preview.confirm_message().contains("Huda"));
    assert_eq!(rafiq.state(), RfImportState::Parsed);

    assert!(rafiq.cancel_import());
    assert_eq!(rafiq.state(), RfImportState::Idle);
    assert!(rafiq.confirm_import(RfImportStrategy::Append).is_err());
    assert!(rafiq.store().keys().unwrap().is_empty());
}

#[test]
fn wrapped_package_without_provenance_uses_fallbacks() {
    let mut rafiq = RfInterchange::new(RfMemoryStorage::new());
    let preview = rafiq.begin_import(br#"{"payload":{"tasks":[]}}"#).unwrap();
    assert_eq!(preview.source_user, "unknown");
    assert!(!preview.legacy);
    assert!(preview.timestamp > 0);
}

#[tokio::test]
async fn selected_file_is_read_asynchronously() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("Rafiq_Backup_full_2025-01-01.json");
    fs::write(&path, WRAPPED).unwrap();

    let mut rafiq = RfInterchange::new(RfMemoryStorage::new());
    let preview = rafiq.begin_import_file(&path).await.expect("read file");
    assert_eq!(preview.keys.len(), 1);

    let report = rafiq.confirm_import(RfImportStrategy::Append).unwrap();
    assert_eq!(report.package_timestamp, 1_700_000_000_000);
}

#[tokio::test]
async fn unreadable_file_is_a_parse_error() {
    let dir = tempdir().expect("tempdir");
    let mut rafiq = RfInterchange::new(RfMemoryStorage::new());
    let err = rafiq
        .begin_import_file(dir.path().join("missing.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, RfError::ImportParse { .. }));
    assert_eq!(rafiq.state(), RfImportState::Failed);
}
