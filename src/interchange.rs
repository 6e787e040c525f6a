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

//! # Interchange Façade
//!
//! The single entry point the surrounding application talks to. It owns one
//! store, the configuration, the current import session and the registered
//! reload observers.
//!
//! Every mutating operation takes `&mut self`, so an import cannot be
//! re-entered while it is committing.

use std::fmt;
use std::path::Path;

use crate::backup::{RfBackupRing, RfBackupSummary};
use crate::config::RfConfig;
use crate::errors::Result;
use crate::export::{RfExportStats, RfExportWriter, RfWriterConfig, FULL_SCOPE_TAG};
use crate::import::{RfImportPreview, RfImportReport, RfImportSession, RfImportState, RfImportStrategy};
use crate::snapshot::{RfExportPackage, RfExportScope, RfSnapshotEngine};
use crate::store::{RfStorage, RfStore};

/// Why the store contents changed underneath the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RfReloadEvent {
    Imported(RfImportReport),
    Restored { backup_id: String },
}

/// Notified after the store was rewritten; derived caches must be reloaded.
pub trait RfReloadObserver {
    fn store_reloaded(&self, event: &RfReloadEvent);
}

impl<F> RfReloadObserver for F
where
    F: Fn(&RfReloadEvent),
{
    fn store_reloaded(&self, event: &RfReloadEvent) {
        self(event)
    }
}

/// Export, import and backup over one injected store.
pub struct RfInterchange<S: RfStorage> {
    store: RfStore<S>,
    config: RfConfig,
    session: RfImportSession,
    observers: Vec<Box<dyn RfReloadObserver>>,
}

impl<S: RfStorage> fmt::Debug for RfInterchange<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RfInterchange")
            .field("config", &self.config)
            .field("state", &self.session.state())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: RfStorage> RfInterchange<S> {
    /// Builds a façade over `storage` with the default configuration.
    #[allow(non_snake_case)]
    pub fn new(storage: S) -> Self {
        Self {
            store: RfStore::new(storage),
            config: RfConfig::default(),
            session: RfImportSession::new(),
            observers: Vec::new(),
        }
    }

    /// Builds a façade with a custom configuration after validating it.
    pub fn with_config(storage: S, config: RfConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(storage)
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &RfConfig {
        &self.config
    }

    /// Names of the managed keys, in export order.
    pub fn list_managed_keys(&self) -> Vec<String> {
        self.config.managed_key_names()
    }

    // Export

    /// Packages every managed key without narrowing.
    pub fn export_full(&self, source_user: &str) -> Result<RfExportPackage> {
        let engine = RfSnapshotEngine::new(&self.store, &self.config);
        let payload = engine.snapshot_full()?;
        Ok(engine.build_package(source_user, payload))
    }

    /// Writes a full export into `dir` under the download file name.
    pub fn export_full_to(&self, source_user: &str, dir: &Path) -> Result<RfExportStats> {
        let package = self.export_full(source_user)?;
        self.writer().write(&package, FULL_SCOPE_TAG, dir)
    }

    /// Packages every managed key, narrowing collections that have a rule
    /// for `scope`.
    pub fn export_filtered(&self, source_user: &str, scope: &RfExportScope) -> Result<RfExportPackage> {
        let engine = RfSnapshotEngine::new(&self.store, &self.config);
        let payload = engine.snapshot_filtered(scope)?;
        Ok(engine.build_package(source_user, payload))
    }

    /// Writes a scoped export into `dir`. Same-day exports of one scope get
    /// distinct file names.
    pub fn export_filtered_to(&self, source_user: &str, scope: &RfExportScope, dir: &Path) -> Result<RfExportStats> {
        let package = self.export_filtered(source_user, scope)?;
        self.writer().write(&package, scope.tag(), dir)
    }

    fn writer(&self) -> RfExportWriter {
        RfExportWriter::new().with_config(RfWriterConfig {
            prefix: self.config.file_prefix.clone(),
            ..Default::default()
        })
    }

    // Import

    /// Parses file bytes into a pending import and returns its preview.
    pub fn begin_import(&mut self, bytes: &[u8]) -> Result<RfImportPreview> {
        self.session.select_file()?;
        self.session.parse(bytes, &self.config)
    }

    /// Reads the selected file and parses it into a pending import.
    ///
    /// A read failure is reported as an import parse error.
    #[cfg(feature = "async-io")]
    pub async fn begin_import_file(&mut self, path: impl AsRef<Path>) -> Result<RfImportPreview> {
        let path = path.as_ref();
        self.session.select_file()?;
        match tokio::fs::read(path).await {
            Ok(bytes) => self.session.parse(&bytes, &self.config),
            Err(err) => {
                let err = crate::errors::RfError::import_parse(format!(
                    "could not read '{}': {err}",
                    path.display()
                ));
                self.session.fail_selection(&err);
                Err(err)
            }
        }
    }

    /// Preview of the parsed import awaiting confirmation, if any.
    pub fn pending_preview(&self) -> Option<RfImportPreview> {
        self.session.pending().map(|parsed| parsed.preview(&self.config))
    }

    /// Commits the pending import with the chosen strategy.
    ///
    /// A backup is always taken first. Observers are notified on success.
    pub fn confirm_import(&mut self, strategy: RfImportStrategy) -> Result<RfImportReport> {
        self.session.choose(strategy)?;
        let report = self.session.commit(&mut self.store, &self.config)?;
        self.notify(&RfReloadEvent::Imported(report.clone()));
        Ok(report)
    }

    /// Drops the pending import without touching the store. Returns whether
    /// anything was pending.
    pub fn cancel_import(&mut self) -> bool {
        self.session.cancel()
    }

    /// Current state of the import session.
    pub fn state(&self) -> RfImportState {
        self.session.state()
    }

    // Backups

    /// Summaries of the saved backups, oldest first.
    pub fn backup_history(&self) -> Result<Vec<RfBackupSummary>> {
        RfBackupRing::new(&self.config).history(&self.store)
    }

    /// Writes a backup entry back to the store and notifies observers.
    pub fn restore_backup(&mut self, entry_id: &str) -> Result<usize> {
        let restored = RfBackupRing::new(&self.config).restore(&mut self.store, entry_id)?;
        self.notify(&RfReloadEvent::Restored {
            backup_id: entry_id.to_string(),
        });
        Ok(restored)
    }

    // Observers and store access

    /// Registers an observer told about every import and restore.
    pub fn subscribe(&mut self, observer: Box<dyn RfReloadObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, event: &RfReloadEvent) {
        for observer in &self.observers {
            observer.store_reloaded(event);
        }
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &RfStore<S> {
        &self.store
    }

    /// Direct write access. Writes made here do not notify observers.
    pub fn store_mut(&mut self) -> &mut RfStore<S> {
        &mut self.store
    }

    /// Consumes the façade and returns its store.
    pub fn into_store(self) -> RfStore<S> {
        self.store
    }
}
