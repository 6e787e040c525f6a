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

//! # Import Session
//!
//! Tracks a single import attempt:
//!
//! ```text
//! Idle -> FileSelected -> Parsed -> ReadyAppend | ReadyReplace -> Committing -> Success | Failed
//! ```
//!
//! Nothing touches the store before [`RfImportSession::commit`], and commit
//! always takes a backup before the first write.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::backup::RfBackupRing;
use crate::config::RfConfig;
use crate::errors::{Result, RfError};
use crate::import::parse::{parse_import, RfImportPreview, RfParsedImport};
use crate::import::reconcile::{RfImportStrategy, RfKeyOutcome, RfReconciler};
use crate::store::{RfStorage, RfStore};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RfImportState {
    #[default]
    Idle,
    FileSelected,
    Parsed,
    ReadyAppend,
    ReadyReplace,
    Committing,
    Success,
    Failed,
}

impl fmt::Display for RfImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FileSelected => "file-selected",
            Self::Parsed => "parsed",
            Self::ReadyAppend => "ready-append",
            Self::ReadyReplace => "ready-replace",
            Self::Committing => "committing",
            Self::Success => "success",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a committed import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfImportReport {
    pub strategy: RfImportStrategy,
    pub source_user: String,
    pub package_timestamp: i64,
    /// Backup taken right before the first write.
    pub backup_id: String,
    pub keys: Vec<RfKeyOutcome>,
    /// Every cache derived from the store must be rebuilt.
    pub reload_required: bool,
}

impl RfImportReport {
    /// Imported records added across all keys.
    pub fn total_added(&self) -> usize {
        self.keys.iter().map(|key| key.added).sum()
    }

    /// Imported records rejected across all keys.
    pub fn total_skipped(&self) -> usize {
        self.keys.iter().map(|key| key.skipped).sum()
    }

    /// Keys the import wrote, in write order.
    pub fn written_keys(&self) -> Vec<&str> {
        self.keys
            .iter()
            .filter(|key| key.written)
            .map(|key| key.key.as_str())
            .collect()
    }

    /// The outcome recorded for `key`, if the import touched it.
    pub fn outcome(&self, key: &str) -> Option<&RfKeyOutcome> {
        self.keys.iter().find(|outcome| outcome.key == key)
    }
}

/// One import attempt, from file selection to commit.
#[derive(Debug, Default)]
pub struct RfImportSession {
    state: RfImportState,
    pending: Option<RfParsedImport>,
}

impl RfImportSession {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Where the current attempt stands.
    pub fn state(&self) -> RfImportState {
        self.state
    }

    /// The parsed import awaiting a strategy and commit.
    pub fn pending(&self) -> Option<&RfParsedImport> {
        self.pending.as_ref()
    }

    /// Starts a new attempt, dropping any previous pending import.
    pub fn select_file(&mut self) -> Result<()> {
        self.ensure_not_committing()?;
        self.pending = None;
        self.state = RfImportState::FileSelected;
        Ok(())
    }

    /// Parses file bytes and holds the result until commit or cancel.
    pub fn parse(&mut self, bytes: &[u8], config: &RfConfig) -> Result<RfImportPreview> {
        if self.state != RfImportState::FileSelected {
            self.select_file()?;
        }
        match parse_import(bytes, config) {
            Ok(parsed) => {
                let preview = parsed.preview(config);
                log::info!(
                    "parsed {} import from '{}' with {} keys",
                    if parsed.is_legacy() { "legacy" } else { "wrapped" },
                    preview.source_user,
                    preview.keys.len()
                );
                self.pending = Some(parsed);
                self.state = RfImportState::Parsed;
                Ok(preview)
            }
            Err(err) => {
                self.fail_selection(&err);
                Err(err)
            }
        }
    }

    /// Records a selected file that could not be read or parsed.
    pub fn fail_selection(&mut self, err: &RfError) {
        log::warn!("rejected import file: {err}");
        self.pending = None;
        self.state = RfImportState::Failed;
    }

    /// Picks the strategy for the pending import.
    pub fn choose(&mut self, strategy: RfImportStrategy) -> Result<()> {
        if self.pending.is_none() || self.state == RfImportState::Committing {
            return Err(RfError::validation(format!(
                "no parsed import to confirm (state: {})",
                self.state
            )));
        }
        self.state = match strategy {
            RfImportStrategy::Append => RfImportState::ReadyAppend,
            RfImportStrategy::Replace => RfImportState::ReadyReplace,
        };
        Ok(())
    }

    /// Abandons the pending import without side effects.
    ///
    /// Returns whether a parsed import was dropped.
    pub fn cancel(&mut self) -> bool {
        if self.state == RfImportState::Committing {
            return false;
        }
        let dropped = self.pending.take().is_some();
        self.state = RfImportState::Idle;
        dropped
    }

    /// Backs up the store, then applies the pending import.
    ///
    /// A failed backup leaves the store untouched and keeps the pending
    /// import so the commit can be retried. A failed write clears it and
    /// reports the backup id.
    pub fn commit<S: RfStorage>(&mut self, store: &mut RfStore<S>, config: &RfConfig) -> Result<RfImportReport> {
        let strategy = match self.state {
            RfImportState::ReadyAppend => RfImportStrategy::Append,
            RfImportState::ReadyReplace => RfImportStrategy::Replace,
            other => {
                return Err(RfError::validation(format!(
                    "import is not ready to commit (state: {other})"
                )))
            }
        };
        let Some(parsed) = self.pending.as_ref() else {
            return Err(RfError::validation("no parsed import to commit"));
        };
        self.state = RfImportState::Committing;

        let backup = match RfBackupRing::new(config).create_backup(store) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("import aborted, backup failed: {err}");
                self.state = RfImportState::Failed;
                return Err(err);
            }
        };

        let package = parsed.package();
        let outcome = RfReconciler::new(config).apply(store, &package.payload, strategy);
        let source_user = package.source_user.clone();
        let package_timestamp = package.timestamp;
        self.pending = None;

        match outcome {
            Ok(keys) => {
                self.state = RfImportState::Success;
                let report = RfImportReport {
                    strategy,
                    source_user,
                    package_timestamp,
                    backup_id: backup.id,
                    keys,
                    reload_required: true,
                };
                log::info!(
                    "{} import from '{}' committed: {} added, {} skipped, backup '{}'",
                    report.strategy,
                    report.source_user,
                    report.total_added(),
                    report.total_skipped(),
                    report.backup_id
                );
                Ok(report)
            }
            Err(err) => {
                self.state = RfImportState::Failed;
                log::warn!("import write failed, restore backup '{}': {err}", backup.id);
                Err(RfError::import_write(backup.id, err.to_string()))
            }
        }
    }

    fn ensure_not_committing(&self) -> Result<()> {
        if self.state == RfImportState::Committing {
            return Err(RfError::validation("an import is being committed"));
        }
        Ok(())
    }
}
