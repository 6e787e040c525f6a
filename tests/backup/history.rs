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

use rafiq::backup::{RfBackupEntry, RfBackupRing};
use rafiq::config::RfConfig;
use rafiq::store::{RfMemoryStorage, RfStore};
use rafiq::RfError;
use serde_json::{json, Map};

fn seeded() -> RfStore<RfMemoryStorage> {
    RfStore::new(RfMemoryStorage::from_pairs([
        ("teachers", r#"[{"id":"t1"}]"#),
        ("theme", "dark"),
        ("draft", "undefined"),
        ("backup_scratch", "1"),
    ]))
}

#[test]
fn backup_captures_every_unreserved_key() {
    let mut store = seeded();
    let config = RfConfig::default();
    let entry = RfBackupRing::new(&config).create_backup(&mut store).unwrap();

    assert!(entry.id.starts_with("backup-"));
    assert_eq!(entry.data["teachers"], json!([{"id": "t1"}]));
    assert_eq!(entry.data["theme"], json!("dark"));
    assert_eq!(entry.data["draft"], json!(null));
    assert!(!entry.data.contains_key("backup_scratch"));
    assert!(!entry.data.contains_key("backup_history"));
}

#[test]
fn history_is_bounded_and_drops_the_oldest() {
    let mut store = seeded();
    let config = RfConfig::default();
    let ring = RfBackupRing::new(&config);

    let ids: Vec<String> = (0..7)
        .map(|_| ring.create_backup(&mut store).unwrap().id)
        .collect();
    let history = ring.history(&store).unwrap();

    assert_eq!(history.len(), 5);
    let kept: Vec<_> = history.iter().map(|s| s.id.clone()).collect();
    assert_eq!(kept, ids[2..].to_vec());
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(ring.latest(&store).unwrap().map(|e| e.id), ids.last().cloned());
}

#[test]
fn oversized_stored_history_is_trimmed_on_next_backup() {
    let config = RfConfig::default().backup_capacity(2);
    let old: Vec<RfBackupEntry> = (0..4)
        .map(|n| RfBackupEntry {
            id: format!("backup-{n}"),
            timestamp: n,
            data: Map::new(),
        })
        .collect();
    let mut store = RfStore::new(RfMemoryStorage::new());
    store
        .set("backup_history", &serde_json::to_value(&old).unwrap())
        .unwrap();

    let ring = RfBackupRing::new(&config);
    let fresh = ring.create_backup(&mut store).unwrap();
    let kept: Vec<_> = ring.history(&store).unwrap().into_iter().map(|s| s.id).collect();
    assert_eq!(kept, vec!["backup-3".to_string(), fresh.id]);
}

#[test]
fn unreadable_history_entries_are_dropped() {
    let mut store = RfStore::new(RfMemoryStorage::new());
    store
        .set(
            "backup_history",
            &json!([{"id": "backup-1", "timestamp": 1, "data": {}}, {"garbage": true}]),
        )
        .unwrap();
    let config = RfConfig::default();
    let history = RfBackupRing::new(&config).history(&store).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].key_count, 0);
}

#[test]
fn restore_writes_entry_data_back() {
    let mut store = seeded();
    let config = RfConfig::default();
    let ring = RfBackupRing::new(&config);
    let entry = ring.create_backup(&mut store).unwrap();

    store.set("teachers", &json!([])).unwrap();
    store.set("created_later", &json!(1)).unwrap();

    let written = ring.restore(&mut store, &entry.id).unwrap();
    assert_eq!(written, entry.data.len());
    assert_eq!(store.get("teachers").unwrap(), Some(json!([{"id": "t1"}])));
    assert_eq!(store.get("created_later").unwrap(), Some(json!(1)));
}

#[test]
fn restoring_an_unknown_id_is_a_validation_error() {
    let mut store = seeded();
    let config = RfConfig::default();
    let err = RfBackupRing::new(&config)
        .restore(&mut store, "backup-0")
        .unwrap_err();
    assert!(matches!(err, RfError::Validation { .. }));
}
