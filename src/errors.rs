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

//! # Rafiq Error Module
//!
//! This module defines the error types used throughout the interchange
//! library for consistent error handling and reporting.
//!
//! ## Error Categories
//!
//! - **ImportParse**: The selected file could not be read or decoded. The
//!   store has not been touched.
//! - **Backup**: The safety snapshot could not be taken. The import was
//!   aborted before any mutation.
//! - **ImportWrite**: A write failed part-way through an import. The store may
//!   be partially updated and the reported backup id can be restored.
//! - **Storage**: The raw key-value backend failed.
//! - **Validation**: Invalid caller input or configuration.
//! - **Io** / **Serde**: Wrapped filesystem and serialization failures.
//!
//! Shape mismatches in stored collections are not errors. They
//! are logged as warnings and the affected value is read as empty.

use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Rafiq.
pub type Result<T> = std::result::Result<T, RfError>;

/// Canonical error enumeration for Rafiq.
#[derive(Debug, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RfError {
    /// The import file is malformed or unreadable.
    #[error("import parse error: {message}")]
    ImportParse { message: String },

    /// The pre-import backup could not be written.
    #[error("backup error: {message}")]
    Backup { message: String },

    /// A store write failed while committing an import.
    #[error("import write error (restore from backup '{backup_id}'): {message}")]
    ImportWrite { backup_id: String, message: String },

    /// The raw key-value backend reported a failure.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Errors originating from filesystem IO.
    #[error("io error: {0}")]
    Io(String),

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),
}

impl From<io::Error> for RfError {
    fn from(err: io::Error) -> Self {
        RfError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RfError {
    fn from(err: serde_json::Error) -> Self {
        RfError::Serde(err.to_string())
    }
}

#[cfg(feature = "yaml")]
impl From<serde_yaml::Error> for RfError {
    fn from(err: serde_yaml::Error) -> Self {
        RfError::Serde(err.to_string())
    }
}

impl RfError {
    /// Helper to construct import parse errors.
    pub fn import_parse<T: Into<String>>(message: T) -> Self {
        RfError::ImportParse {
            message: message.into(),
        }
    }

    /// Helper to construct backup errors.
    pub fn backup<T: Into<String>>(message: T) -> Self {
        RfError::Backup {
            message: message.into(),
        }
    }

    /// Helper to construct import write errors.
    pub fn import_write(backup_id: impl Into<String>, message: impl Into<String>) -> Self {
        RfError::ImportWrite {
            backup_id: backup_id.into(),
            message: message.into(),
        }
    }

    /// Helper to construct storage errors.
    pub fn storage<T: Into<String>>(message: T) -> Self {
        RfError::Storage {
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        RfError::Validation {
            message: message.into(),
        }
    }

    /// Message shown to the user for a failed interchange action.
    pub fn user_message(&self) -> String {
        match self {
            RfError::ImportParse { .. } => {
                "The selected file could not be read. Please choose a valid export file.".to_string()
            }
            RfError::Backup { .. } => {
                "A safety backup could not be created, so nothing was imported.".to_string()
            }
            RfError::ImportWrite { backup_id, .. } => format!(
                "The import stopped part-way. Your previous data is saved in backup '{backup_id}'."
            ),
            other => other.to_string(),
        }
    }
}
