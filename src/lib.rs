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

//! # Rafiq Interchange Library
//!
//! Data interchange for the Rafiq evaluation and reporting application, whose
//! state lives entirely in key-value storage. The library exports filtered
//! subsets of that storage to a portable file, imports such files back with
//! an additive merge or a full replacement, and keeps a rolling backup of the
//! store before every import.
//!
//! ## Module Overview
//!
//! - **errors**: `RfError` and the crate `Result` alias
//! - **config**: managed keys, reserved backup keys and file naming
//! - **store**: the raw storage seam, memory and file backends, JSON adapter
//! - **record**: named collections of `id`-keyed records
//! - **snapshot**: full and scoped snapshots, the export package format
//! - **export**: atomic export file writing
//! - **backup**: bounded FIFO history of whole-store snapshots
//! - **import**: parsing, append/replace reconciliation, the import session
//! - **interchange**: the façade wiring everything over one store
//!
//! ## Feature Flags
//!
//! - `yaml`: YAML configuration files
//! - `async-io`: `begin_import_file` reads the selected file through Tokio
//!
//! ## Quick Start
//!
//! ```rust
//! use rafiq::{RfImportStrategy, RfInterchange, RfMemoryStorage};
//!
//! let mut rafiq = RfInterchange::new(RfMemoryStorage::new());
//! let preview = rafiq
//!     .begin_import(br#"{"sourceUser":"a","timestamp":0,"payload":{"teachers":[{"id":"t1"}]}}"#)
//!     .unwrap();
//! assert_eq!(preview.source_user, "a");
//!
//! let report = rafiq.confirm_import(RfImportStrategy::Append).unwrap();
//! assert!(report.reload_required);
//! assert_eq!(rafiq.export_full("a").unwrap().total_records(), 1);
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, RfError>`. An import failure names the
//! stage it failed in: parsing, the pre-import backup, or the write itself.

#![allow(non_snake_case)]

pub mod errors;
pub mod config;
pub mod store;
pub mod record;
pub mod snapshot;
pub mod export;
pub mod backup;
pub mod import;
pub mod interchange;

pub use errors::{Result, RfError};
pub use config::RfConfig;
pub use store::{RfFilePersistOptions, RfFileStorage, RfMemoryStorage, RfStorage, RfStore};
pub use record::{record_id, RfCollection, RfCollections, RfKeyShape, RfManagedKey, RfRecord};
pub use snapshot::{RfExportPackage, RfExportScope, RfPayload, RfSnapshotEngine};
pub use export::{RfExportStats, RfExportWriter, RfWriterConfig};
pub use backup::{RfBackupEntry, RfBackupRing, RfBackupSummary};
pub use import::{
    parse_import, RfImportPreview, RfImportReport, RfImportSession, RfImportState,
    RfImportStrategy, RfKeyOutcome, RfParsedImport, RfReconciler,
};
pub use interchange::{RfInterchange, RfReloadEvent, RfReloadObserver};
