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

//! # Interchange Configuration
//!
//! [`RfConfig`] names the managed key set and the reserved keys used by the
//! backup history, together with the cosmetic export settings. Defaults
//! match the keys the Rafiq application writes. A configuration may also be
//! loaded from a JSON or YAML file.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RfError};
use crate::record::RfManagedKey;

/// Key holding the currently selected school.
pub const SELECTED_SCHOOL_KEY: &str = "selectedSchool";

/// Store key of the backup history.
pub const BACKUP_HISTORY_KEY: &str = "backup_history";

/// Prefix reserved for the backup mechanism's own keys.
pub const RESERVED_BACKUP_PREFIX: &str = "backup_";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RfConfig {
    /// Managed keys in export order.
    pub managed_keys: Vec<RfManagedKey>,
    pub backup_key: String,
    /// Keys starting with this prefix are never captured by a backup.
    pub reserved_prefix: String,
    /// Maximum number of entries kept in the backup history.
    pub backup_capacity: usize,
    pub file_prefix: String,
    pub format_version: String,
    pub legacy_format_version: String,
    pub legacy_source_user: String,
    /// Source label used when a wrapped package has no `sourceUser`.
    pub unknown_source_user: String,
    pub selected_school_key: String,
    /// Also skip imported teachers whose name matches a local teacher.
    pub dedup_teachers_by_name: bool,
}

impl Default for RfConfig {
    fn default() -> Self {
        let collections = [
            "teachers",
            "reports",
            "schools",
            "customCriteria",
            "specialReportTemplates",
            "syllabusPlans",
            "tasks",
            "meetings",
            "peerVisits",
            "deliverySheets",
            "bulkMessages",
            "syllabusCoverageReports",
            "supervisoryPlans",
        ];
        let mut managed_keys: Vec<RfManagedKey> =
            collections.iter().map(|name| RfManagedKey::collection(*name)).collect();
        managed_keys.push(RfManagedKey::config("hiddenCriteria"));

        Self {
            managed_keys,
            backup_key: BACKUP_HISTORY_KEY.to_string(),
            reserved_prefix: RESERVED_BACKUP_PREFIX.to_string(),
            backup_capacity: 5,
            file_prefix: "Rafiq_Backup".to_string(),
            format_version: "2.0".to_string(),
            legacy_format_version: "1.0-legacy".to_string(),
            legacy_source_user: "legacy".to_string(),
            unknown_source_user: "unknown".to_string(),
            selected_school_key: SELECTED_SCHOOL_KEY.to_string(),
            dedup_teachers_by_name: false,
        }
    }
}

impl RfConfig {
    #[allow(non_snake_case)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a configuration file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        let config = match ext.as_str() {
            "json" => Self::from_json_str(&text)?,
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            other => {
                return Err(RfError::validation(format!(
                    "unsupported config extension '{other}'"
                )))
            }
        };
        Ok(config)
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a YAML configuration.
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks capacity, prefixes and the managed key list.
    ///
    /// Managed keys must be unique, non-empty and outside the reserved prefix.
    pub fn validate(&self) -> Result<()> {
        if self.backup_capacity == 0 {
            return Err(RfError::validation("backup_capacity must be positive"));
        }
        if self.reserved_prefix.is_empty() {
            return Err(RfError::validation("reserved_prefix may not be empty"));
        }
        if !self.backup_key.starts_with(&self.reserved_prefix) {
            return Err(RfError::validation(format!(
                "backup_key '{}' must start with the reserved prefix '{}'",
                self.backup_key, self.reserved_prefix
            )));
        }
        if self.file_prefix.trim().is_empty() {
            return Err(RfError::validation("file_prefix may not be empty"));
        }
        let mut seen = HashSet::new();
        for key in &self.managed_keys {
            if key.name.is_empty() {
                return Err(RfError::validation("managed key names may not be empty"));
            }
            if !seen.insert(key.name.as_str()) {
                return Err(RfError::validation(format!(
                    "managed key '{}' is listed twice",
                    key.name
                )));
            }
            if key.name.starts_with(&self.reserved_prefix) {
                return Err(RfError::validation(format!(
                    "managed key '{}' uses the reserved prefix",
                    key.name
                )));
            }
        }
        Ok(())
    }

    /// Looks up a managed key by name.
    pub fn managed_key(&self, name: &str) -> Option<&RfManagedKey> {
        self.managed_keys.iter().find(|key| key.name == name)
    }

    /// Whether `name` is part of the managed set.
    pub fn is_managed(&self, name: &str) -> bool {
        self.managed_key(name).is_some()
    }

    /// Whether `name` belongs to the backup mechanism and is never captured.
    pub fn is_reserved(&self, name: &str) -> bool {
        name.starts_with(&self.reserved_prefix)
    }

    /// Managed key names in declaration order.
    pub fn managed_key_names(&self) -> Vec<String> {
        self.managed_keys.iter().map(|key| key.name.clone()).collect()
    }

    pub fn managed_keys(mut self, keys: Vec<RfManagedKey>) -> Self {
        self.managed_keys = keys;
        self
    }

    pub fn backup_capacity(mut self, capacity: usize) -> Self {
        self.backup_capacity = capacity;
        self
    }

    pub fn file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self
    }

    pub fn format_version(mut self, version: &str) -> Self {
        self.format_version = version.to_string();
        self
    }

    pub fn legacy_source_user(mut self, label: &str) -> Self {
        self.legacy_source_user = label.to_string();
        self
    }

    pub fn selected_school_key(mut self, key: &str) -> Self {
        self.selected_school_key = key.to_string();
        self
    }

    pub fn dedup_teachers_by_name(mut self, enabled: bool) -> Self {
        self.dedup_teachers_by_name = enabled;
        self
    }
}
