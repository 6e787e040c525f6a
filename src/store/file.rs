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

//! # File Storage Backend
//!
//! Persists the whole key space as one JSON object of `key -> stored text`.
//! Every mutation rewrites the file, atomically by default, so a crash leaves
//! either the previous or the new image on disk.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::{Result, RfError};
use crate::store::adapter::RfStorage;

/// Options controlling how the storage file is written.
#[derive(Clone, Debug)]
pub struct RfFilePersistOptions {
    pub pretty: bool,
    pub atomic: bool,
    pub create_directories: bool,
}

impl Default for RfFilePersistOptions {
    fn default() -> Self {
        RfFilePersistOptions {
            pretty: false,
            atomic: true,
            create_directories: true,
        }
    }
}

/// Backend stored in a single JSON file.
#[derive(Debug)]
pub struct RfFileStorage {
    path: PathBuf,
    options: RfFilePersistOptions,
    entries: BTreeMap<String, String>,
}

impl RfFileStorage {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, RfFilePersistOptions::default())
    }

    /// Opens `path` with explicit persistence options.
    pub fn open_with_options(path: impl AsRef<Path>, options: RfFilePersistOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let file = File::open(&path)?;
            serde_json::from_reader(BufReader::new(file)).map_err(|err| {
                RfError::storage(format!(
                    "storage file '{}' is not a key/value object: {err}",
                    path.display()
                ))
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            options,
            entries,
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        let path = self.path.as_path();
        if self.options.create_directories {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
        }

        if self.options.atomic {
            let parent = path.parent().unwrap_or_else(|| Path::new("."));
            let stem = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("store");
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos();
            let tmp_path = parent.join(format!(".{stem}.tmp.{nanos}"));

            let mut file = File::create(&tmp_path)?;
            {
                let mut writer = BufWriter::new(&mut file);
                self.write_entries(&mut writer)?;
                writer.flush()?;
            }
            file.sync_all()?;
            fs::rename(&tmp_path, path)?;
        } else {
            let mut file = File::create(path)?;
            {
                let mut writer = BufWriter::new(&mut file);
                self.write_entries(&mut writer)?;
                writer.flush()?;
            }
            file.sync_all()?;
        }
        Ok(())
    }

    fn write_entries<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.options.pretty {
            serde_json::to_writer_pretty(writer, &self.entries)?;
        } else {
            serde_json::to_writer(writer, &self.entries)?;
        }
        Ok(())
    }

    fn storage_err(&self, err: RfError) -> RfError {
        match err {
            RfError::Io(message) | RfError::Serde(message) => RfError::storage(format!(
                "failed to persist '{}': {message}",
                self.path.display()
            )),
            other => other,
        }
    }
}

impl RfStorage for RfFileStorage {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(err) = self.persist() {
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(self.storage_err(err));
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(err) = self.persist() {
            self.entries.insert(key.to_string(), previous);
            return Err(self.storage_err(err));
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
