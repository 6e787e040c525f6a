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

//! # Import Reconciliation
//!
//! Applies an imported payload to the store under one of two strategies.
//!
//! - **Append**: strictly additive. Imported records whose `id` is already
//!   present are skipped, never merged field by field. Existing singular
//!   configuration values always win.
//! - **Replace**: every managed key is removed first, then the payload is
//!   written. Collection keys receive `[]` when the payload holds a
//!   non-array value.
//!
//! Neither strategy takes the backup; the caller does that before calling in.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::RfConfig;
use crate::errors::{Result, RfError};
use crate::record::{json_kind, record_id, record_str, warn_shape, RfCollection, RfKeyShape};
use crate::snapshot::RfPayload;
use crate::store::{RfStorage, RfStore};

const TEACHERS_KEY: &str = "teachers";
const SCHOOLS_KEY: &str = "schools";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfImportStrategy {
    Append,
    Replace,
}

impl fmt::Display for RfImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Append => f.write_str("append"),
            Self::Replace => f.write_str("replace"),
        }
    }
}

impl FromStr for RfImportStrategy {
    type Err = RfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "merge" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(RfError::validation(format!("unknown import strategy '{other}'"))),
        }
    }
}

/// What happened to one managed key during an import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfKeyOutcome {
    pub key: String,
    /// Imported records added to the collection.
    pub added: usize,
    /// Imported records rejected as duplicates or lacking an id.
    pub skipped: usize,
    /// Whether the key was written.
    pub written: bool,
}

impl RfKeyOutcome {
    fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }
}

/// Applies payloads to a store according to the configured managed keys.
#[derive(Debug)]
pub struct RfReconciler<'a> {
    config: &'a RfConfig,
}

impl<'a> RfReconciler<'a> {
    #[allow(non_snake_case)]
    pub fn new(config: &'a RfConfig) -> Self {
        Self { config }
    }

    /// Applies `payload` under `strategy` and reports per-key outcomes.
    pub fn apply<S: RfStorage>(
        &self,
        store: &mut RfStore<S>,
        payload: &RfPayload,
        strategy: RfImportStrategy,
    ) -> Result<Vec<RfKeyOutcome>> {
        match strategy {
            RfImportStrategy::Append => self.append(store, payload),
            RfImportStrategy::Replace => self.replace(store, payload),
        }
    }

    /// Additive merge of every managed key present in the payload.
    pub fn append<S: RfStorage>(&self, store: &mut RfStore<S>, payload: &RfPayload) -> Result<Vec<RfKeyOutcome>> {
        let mut outcomes = Vec::new();
        for (key, imported) in payload {
            let Some(managed) = self.config.managed_key(key) else {
                log::debug!("ignoring unmanaged key '{key}' in import");
                continue;
            };
            let mut outcome = RfKeyOutcome::new(key);
            let local = store.get(key)?;

            match (imported, local) {
                (Value::Array(items), local) => {
                    let local_items = match local {
                        Some(Value::Array(local_items)) => local_items,
                        Some(other) if managed.shape == RfKeyShape::Config => {
                            log::debug!("keeping local {} under '{key}'", json_kind(&other));
                            outcome.skipped = items.len();
                            outcomes.push(outcome);
                            continue;
                        }
                        Some(other) => {
                            warn_shape(key, &other);
                            Vec::new()
                        }
                        None => Vec::new(),
                    };
                    let by_name = self.config.dedup_teachers_by_name && key == TEACHERS_KEY;
                    let merge = merge_by_id(local_items, items, by_name);
                    outcome.added = merge.added;
                    outcome.skipped = merge.skipped;
                    store.set(key, &Value::Array(merge.records))?;
                    outcome.written = true;
                }
                (Value::Null, _) => {}
                (value, None) => {
                    store.set(key, value)?;
                    outcome.written = true;
                }
                (_, Some(_)) => {
                    log::debug!("local value under '{key}' wins over imported value");
                }
            }

            log::debug!(
                "append '{key}': added {}, skipped {}",
                outcome.added,
                outcome.skipped
            );
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Clears every managed key, then writes the payload's managed keys.
    pub fn replace<S: RfStorage>(&self, store: &mut RfStore<S>, payload: &RfPayload) -> Result<Vec<RfKeyOutcome>> {
        for key in &self.config.managed_keys {
            store.remove(&key.name)?;
        }

        let mut outcomes = Vec::new();
        for key in &self.config.managed_keys {
            let Some(imported) = payload.get(&key.name) else {
                continue;
            };
            let mut outcome = RfKeyOutcome::new(&key.name);
            let value = match imported {
                Value::Array(items) => {
                    outcome.added = items.len();
                    imported.clone()
                }
                other if key.is_collection() => {
                    warn_shape(&key.name, other);
                    Value::Array(Vec::new())
                }
                other => other.clone(),
            };
            if !value.is_null() {
                store.set(&key.name, &value)?;
                outcome.written = true;
            }
            outcomes.push(outcome);
        }

        if self.config.is_managed(SCHOOLS_KEY) {
            let first_school = payload
                .get(SCHOOLS_KEY)
                .and_then(Value::as_array)
                .and_then(|schools| schools.first())
                .and_then(|school| record_str(school, "name"));
            if let Some(name) = first_school {
                store.set(&self.config.selected_school_key, &Value::String(name.to_string()))?;
                log::debug!("selected school set to '{name}' after replace");
            }
        }

        Ok(outcomes)
    }
}

/// Result of merging imported records into a local collection.
#[derive(Debug, PartialEq)]
pub struct RfMergeResult {
    pub records: RfCollection,
    pub added: usize,
    pub skipped: usize,
}

/// Appends imported records whose id is not present locally.
///
/// Local records are kept untouched and in order. Records without a
/// non-empty id are skipped. Only local ids are checked, so repeated ids
/// inside one import are all appended. With `by_name`, records whose trimmed
/// `name` matches a local or already appended one are skipped too.
pub fn merge_by_id(local: RfCollection, imported: &[Value], by_name: bool) -> RfMergeResult {
    let ids: HashSet<String> = local
        .iter()
        .filter_map(record_id)
        .map(str::to_string)
        .collect();
    let mut names: HashSet<String> = if by_name {
        local.iter().filter_map(display_name).collect()
    } else {
        HashSet::new()
    };

    let mut records = local;
    let mut added = 0;
    let mut skipped = 0;
    for item in imported {
        let Some(id) = record_id(item) else {
            skipped += 1;
            continue;
        };
        if ids.contains(id) {
            skipped += 1;
            continue;
        }
        let name = if by_name { display_name(item) } else { None };
        if let Some(name) = &name {
            if names.contains(name) {
                skipped += 1;
                continue;
            }
        }
        if let Some(name) = name {
            names.insert(name);
        }
        records.push(item.clone());
        added += 1;
    }

    RfMergeResult {
        records,
        added,
        skipped,
    }
}

fn display_name(record: &Value) -> Option<String> {
    record_str(record, "name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
