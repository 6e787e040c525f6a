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

//! # Import File Parsing
//!
//! Decides once, at parse time, whether a file is a wrapped export package or
//! a legacy bare payload. Later stages only see [`RfParsedImport`].

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RfConfig;
use crate::errors::{Result, RfError};
use crate::snapshot::{now_millis, RfExportPackage};

/// A successfully parsed import file.
#[derive(Clone, Debug, PartialEq)]
pub enum RfParsedImport {
    /// A bare payload object from an older export, wrapped with synthesized
    /// provenance.
    Legacy(RfExportPackage),
    /// A package carrying its own `payload` and provenance.
    Wrapped(RfExportPackage),
}

impl RfParsedImport {
    /// The package, whichever shape it was parsed from.
    pub fn package(&self) -> &RfExportPackage {
        match self {
            Self::Legacy(package) | Self::Wrapped(package) => package,
        }
    }

    /// Consumes the import and returns its package.
    pub fn into_package(self) -> RfExportPackage {
        match self {
            Self::Legacy(package) | Self::Wrapped(package) => package,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Summarizes the import for a confirmation prompt.
    pub fn preview(&self, config: &RfConfig) -> RfImportPreview {
        let package = self.package();
        let keys = package
            .payload
            .iter()
            .map(|(key, value)| RfPreviewKey {
                key: key.clone(),
                records: value.as_array().map(Vec::len),
                managed: config.is_managed(key),
            })
            .collect();
        RfImportPreview {
            source_user: package.source_user.clone(),
            timestamp: package.timestamp,
            format_version: package.format_version.clone(),
            legacy: self.is_legacy(),
            keys,
        }
    }
}

/// One payload key as shown before confirming an import.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfPreviewKey {
    pub key: String,
    /// Record count for array values.
    pub records: Option<usize>,
    /// Unmanaged keys are ignored on import.
    pub managed: bool,
}

/// What the user is asked to confirm.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfImportPreview {
    pub source_user: String,
    pub timestamp: i64,
    pub format_version: Option<String>,
    pub legacy: bool,
    pub keys: Vec<RfPreviewKey>,
}

impl RfImportPreview {
    /// Text for the confirmation prompt shown before committing.
    pub fn confirm_message(&self) -> String {
        let date = Utc
            .timestamp_millis_opt(self.timestamp)
            .single()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| self.timestamp.to_string());
        let records: usize = self
            .keys
            .iter()
            .filter(|key| key.managed)
            .filter_map(|key| key.records)
            .sum();
        format!(
            "Import {records} records from '{}' exported on {date}? A backup of the current data is taken first.",
            self.source_user
        )
    }
}

/// Parses raw file bytes into a wrapped or legacy import.
///
/// The top-level value must be a JSON object. Arrays and scalars have no
/// keys to reconcile and are rejected as [`RfError::ImportParse`].
pub fn parse_import(bytes: &[u8], config: &RfConfig) -> Result<RfParsedImport> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| RfError::import_parse(format!("file is not UTF-8 text: {err}")))?;
    let text = text.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return Err(RfError::import_parse("file is empty"));
    }
    let parsed: Value = serde_json::from_str(text)
        .map_err(|err| RfError::import_parse(format!("file is not valid JSON: {err}")))?;

    let Value::Object(root) = parsed else {
        return Err(RfError::import_parse(
            "file does not contain a JSON object",
        ));
    };

    if matches!(root.get("payload"), Some(Value::Object(_))) {
        Ok(RfParsedImport::Wrapped(wrapped_package(root, config)))
    } else {
        Ok(RfParsedImport::Legacy(
            RfExportPackage::new(config.legacy_source_user.clone(), root)
                .with_format_version(config.legacy_format_version.clone()),
        ))
    }
}

fn wrapped_package(mut root: Map<String, Value>, config: &RfConfig) -> RfExportPackage {
    let payload = match root.remove("payload") {
        Some(Value::Object(payload)) => payload,
        _ => Map::new(),
    };
    let source_user = root
        .get("sourceUser")
        .and_then(Value::as_str)
        .filter(|user| !user.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| config.unknown_source_user.clone());
    let timestamp = root
        .get("timestamp")
        .and_then(|ts| ts.as_i64().or_else(|| ts.as_f64().map(|f| f as i64)))
        .unwrap_or_else(now_millis);
    let format_version = root
        .get("formatVersion")
        .and_then(Value::as_str)
        .map(str::to_string);

    RfExportPackage {
        source_user,
        timestamp,
        payload,
        format_version,
    }
}
