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

//! # Backup History Module
//!
//! A bounded FIFO of whole-store snapshots kept under the reserved
//! `backup_history` key. A snapshot is appended before every import so the
//! previous store image can always be written back.
//!
//! ## Invariants
//!
//! - The history holds at most `backup_capacity` entries, oldest first
//! - Eviction only ever drops the oldest entry
//! - Keys under the reserved prefix are never captured, so backups do not nest

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RfConfig;
use crate::errors::{Result, RfError};
use crate::record::warn_shape;
use crate::snapshot::{now_millis, RfSnapshotEngine};
use crate::store::{RfStorage, RfStore};

/// One saved store image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RfBackupEntry {
    pub id: String,
    /// Epoch milliseconds at capture.
    pub timestamp: i64,
    /// Every non-reserved store key at capture time, decoded.
    pub data: Map<String, Value>,
}

/// Display metadata for one backup entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfBackupSummary {
    pub id: String,
    pub timestamp: i64,
    pub key_count: usize,
}

impl From<&RfBackupEntry> for RfBackupSummary {
    fn from(entry: &RfBackupEntry) -> Self {
        Self {
            id: entry.id.clone(),
            timestamp: entry.timestamp,
            key_count: entry.data.len(),
        }
    }
}

/// Reads and appends to the backup history of a store.
#[derive(Debug)]
pub struct RfBackupRing<'a> {
    config: &'a RfConfig,
}

impl<'a> RfBackupRing<'a> {
    #[allow(non_snake_case)]
    pub fn new(config: &'a RfConfig) -> Self {
        Self { config }
    }

    /// Loads the stored history, oldest first.
    ///
    /// A missing or misshapen history reads as empty. Unreadable entries are
    /// skipped here but stay in storage; [`create_backup`](Self::create_backup)
    /// carries them through until FIFO eviction reaches them.
    pub fn load<S: RfStorage>(&self, store: &RfStore<S>) -> Result<Vec<RfBackupEntry>> {
        Ok(self
            .load_raw(store)?
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<RfBackupEntry>(item) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("skipping unreadable backup entry: {err}");
                    None
                }
            })
            .collect())
    }

    fn load_raw<S: RfStorage>(&self, store: &RfStore<S>) -> Result<Vec<Value>> {
        match store.get(&self.config.backup_key)? {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => {
                warn_shape(&self.config.backup_key, &other);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    /// Snapshots the store and appends it to the history.
    ///
    /// Any failure is reported as [`RfError::Backup`].
    pub fn create_backup<S: RfStorage>(&self, store: &mut RfStore<S>) -> Result<RfBackupEntry> {
        self.try_create(store).map_err(|err| match err {
            RfError::Backup { .. } => err,
            other => RfError::backup(other.to_string()),
        })
    }

    fn try_create<S: RfStorage>(&self, store: &mut RfStore<S>) -> Result<RfBackupEntry> {
        let data = RfSnapshotEngine::new(store, self.config).snapshot_store()?;
        let mut history = self.load_raw(store)?;

        let timestamp = now_millis();
        let entry = RfBackupEntry {
            id: unique_id(timestamp, &history),
            timestamp,
            data,
        };
        history.push(serde_json::to_value(&entry)?);
        while history.len() > self.config.backup_capacity {
            let evicted = history.remove(0);
            log::debug!(
                "evicted oldest backup '{}'",
                evicted.get("id").and_then(Value::as_str).unwrap_or("<unreadable>")
            );
        }

        let kept = history.len();
        store.set(&self.config.backup_key, &Value::Array(history))?;
        log::info!(
            "created backup '{}' with {} keys ({kept} kept)",
            entry.id,
            entry.data.len()
        );
        Ok(entry)
    }

    /// Summaries of the readable entries, oldest first.
    pub fn history<S: RfStorage>(&self, store: &RfStore<S>) -> Result<Vec<RfBackupSummary>> {
        Ok(self.load(store)?.iter().map(RfBackupSummary::from).collect())
    }

    /// The most recent readable entry.
    pub fn latest<S: RfStorage>(&self, store: &RfStore<S>) -> Result<Option<RfBackupEntry>> {
        Ok(self.load(store)?.pop())
    }

    /// Looks an entry up by id.
    pub fn find<S: RfStorage>(&self, store: &RfStore<S>, entry_id: &str) -> Result<Option<RfBackupEntry>> {
        Ok(self.load(store)?.into_iter().find(|entry| entry.id == entry_id))
    }

    /// Writes every key of the entry's data back to the store.
    ///
    /// Keys created after the backup are left in place. Returns the number of
    /// keys written.
    pub fn restore<S: RfStorage>(&self, store: &mut RfStore<S>, entry_id: &str) -> Result<usize> {
        let entry = self
            .find(store, entry_id)?
            .ok_or_else(|| RfError::validation(format!("no backup with id '{entry_id}'")))?;
        restore_entry(store, &entry)?;
        log::info!("restored backup '{}' ({} keys)", entry.id, entry.data.len());
        Ok(entry.data.len())
    }
}

/// Writes an entry's data back verbatim.
pub fn restore_entry<S: RfStorage>(store: &mut RfStore<S>, entry: &RfBackupEntry) -> Result<()> {
    for (key, value) in &entry.data {
        store.set(key, value)?;
    }
    Ok(())
}

fn unique_id(timestamp: i64, history: &[Value]) -> String {
    let taken = |candidate: &str| {
        history
            .iter()
            .any(|entry| entry.get("id").and_then(Value::as_str) == Some(candidate))
    };
    let base = format!("backup-{timestamp}");
    if !taken(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
