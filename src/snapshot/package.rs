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

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, RfError};

/// Managed key to collection or configuration value.
pub type RfPayload = Map<String, Value>;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Portable, provenance-stamped export file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfExportPackage {
    pub source_user: String,
    /// Epoch milliseconds at creation.
    pub timestamp: i64,
    pub payload: RfPayload,
    /// Informational only; never changes import behaviour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
}

impl RfExportPackage {
    /// Wraps a payload, stamped with the current time.
    #[allow(non_snake_case)]
    pub fn new(source_user: impl Into<String>, payload: RfPayload) -> Self {
        Self {
            source_user: source_user.into(),
            timestamp: now_millis(),
            payload,
            format_version: None,
        }
    }

    pub fn with_format_version(mut self, version: impl Into<String>) -> Self {
        self.format_version = Some(version.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serializes the package as pretty-printed UTF-8 JSON.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| RfError::Serde(format!("failed to serialize export package: {e}")))
    }

    /// Number of records stored under `key`, or `None` for non-array values.
    pub fn record_count(&self, key: &str) -> Option<usize> {
        self.payload.get(key).and_then(Value::as_array).map(Vec::len)
    }

    /// Total records across all array-valued keys.
    pub fn total_records(&self) -> usize {
        self.payload
            .values()
            .filter_map(Value::as_array)
            .map(Vec::len)
            .sum()
    }
}
