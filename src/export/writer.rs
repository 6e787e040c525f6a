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

//! # Export Writer Module
//!
//! Writes export packages to disk under the download file-name convention
//! `<Prefix>_<scope>_<YYYY-MM-DD>.json`. A second export of the same scope on
//! the same day gets a `-<n>` suffix instead of replacing the first file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::snapshot::RfExportPackage;

/// Scope tag used for unfiltered exports.
pub const FULL_SCOPE_TAG: &str = "full";

/// Configuration for the export writer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RfWriterConfig {
    /// File-name prefix.
    pub prefix: String,
    /// Use atomic write (write to temp then rename).
    pub atomic_write: bool,
    /// Replace an existing file of the same name instead of picking a
    /// suffixed one.
    pub overwrite: bool,
}

impl Default for RfWriterConfig {
    fn default() -> Self {
        Self {
            prefix: "Rafiq_Backup".to_string(),
            atomic_write: true,
            overwrite: false,
        }
    }
}

/// Statistics about one written export file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfExportStats {
    pub path: PathBuf,
    pub bytes_written: usize,
    /// Records across all array-valued keys.
    pub records_written: usize,
    /// BLAKE3 hex digest of the written bytes.
    pub digest: String,
}

/// Builds the download file name for a scope tag and date.
pub fn export_file_name(prefix: &str, scope_tag: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}_{scope_tag}_{}.json", at.format("%Y-%m-%d"))
}

/// BLAKE3 hex digest of a byte slice.
pub fn compute_digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Writes serialized packages into a target directory.
#[derive(Debug, Default)]
pub struct RfExportWriter {
    config: RfWriterConfig,
}

impl RfExportWriter {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RfWriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Writes `package` into `dir` and returns what was written.
    pub fn write(&self, package: &RfExportPackage, scope_tag: &str, dir: &Path) -> Result<RfExportStats> {
        let bytes = package.to_json_bytes()?;
        let path = self.target_path(dir, &export_file_name(&self.config.prefix, scope_tag, Utc::now()));
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }

        if self.config.atomic_write {
            let temp_path = self.temp_path(&path);
            self.write_to_path(&bytes, &temp_path)?;
            fs::rename(&temp_path, &path)?;
        } else {
            self.write_to_path(&bytes, &path)?;
        }

        log::info!(
            "exported {} records from '{}' to {}",
            package.total_records(),
            package.source_user,
            path.display()
        );

        Ok(RfExportStats {
            path,
            bytes_written: bytes.len(),
            records_written: package.total_records(),
            digest: compute_digest(&bytes),
        })
    }

    fn target_path(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        if self.config.overwrite || !path.exists() {
            return path;
        }
        let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
        let mut n = 1;
        loop {
            let candidate = dir.join(format!("{stem}-{n}.json"));
            if !candidate.exists() {
                log::debug!("'{}' exists, exporting to '{}'", path.display(), candidate.display());
                return candidate;
            }
            n += 1;
        }
    }

    fn write_to_path(&self, bytes: &[u8], path: &Path) -> Result<()> {
        let mut file = File::create(path)?;
        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(bytes)?;
            writer.flush()?;
        }
        file.sync_all()?;
        Ok(())
    }

    fn temp_path(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export");
        let parent = path.parent().unwrap_or(Path::new("."));
        parent.join(format!(".{stem}.tmp"))
    }
}
