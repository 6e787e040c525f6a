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

//! # Rafiq Record Module
//!
//! Records are JSON objects carrying a string `id` plus arbitrary fields.
//! They live in named collections, each stored under one managed key. A few
//! managed keys hold a single configuration value instead of a collection.
//!
//! ## Shape Rules
//!
//! - A collection read never fails: an absent or non-array value reads as an
//!   empty collection
//! - A present non-array value under a collection key is a storage shape
//!   warning. It is logged and otherwise ignored
//! - Configuration reads follow the store's absence rules and are returned
//!   as-is

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::store::{RfStorage, RfStore};

/// A stored record: a JSON object with an `id` field.
pub type RfRecord = Map<String, Value>;

/// Ordered records of one collection, as stored.
pub type RfCollection = Vec<Value>;

/// Expected shape of the value stored under a managed key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RfKeyShape {
    /// An ordered sequence of records.
    Collection,
    /// A singular configuration value (object or primitive).
    Config,
}

/// A store key known to the interchange subsystem.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfManagedKey {
    pub name: String,
    pub shape: RfKeyShape,
}

impl RfManagedKey {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: RfKeyShape::Collection,
        }
    }

    pub fn config(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: RfKeyShape::Config,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.shape == RfKeyShape::Collection
    }
}

/// Returns the non-empty string `id` of a record, if it has one.
pub fn record_id(record: &Value) -> Option<&str> {
    record
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

/// Returns a string field of a record.
pub fn record_str<'a>(record: &'a Value, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// Read-only view of the named collections held in a store.
pub struct RfCollections<'a, S: RfStorage> {
    store: &'a RfStore<S>,
}

impl<'a, S: RfStorage> RfCollections<'a, S> {
    #[allow(non_snake_case)]
    pub fn new(store: &'a RfStore<S>) -> Self {
        Self { store }
    }

    /// Reads a collection, yielding an empty one for absent or misshapen values.
    pub fn read_collection(&self, key: &str) -> Result<RfCollection> {
        Ok(match self.store.get(key)? {
            Some(Value::Array(items)) => items,
            Some(other) => {
                warn_shape(key, &other);
                Vec::new()
            }
            None => Vec::new(),
        })
    }

    /// Reads a singular configuration value.
    pub fn read_config(&self, key: &str) -> Result<Option<Value>> {
        self.store.get(key)
    }

    /// Reads a managed key according to its declared shape.
    ///
    /// An absent collection reads as `[]` and an absent configuration value
    /// as `null`, so every managed key always yields a value.
    pub fn read_managed(&self, key: &RfManagedKey) -> Result<Value> {
        match key.shape {
            RfKeyShape::Collection => Ok(Value::Array(self.read_collection(&key.name)?)),
            RfKeyShape::Config => Ok(self.read_config(&key.name)?.unwrap_or(Value::Null)),
        }
    }
}

/// Logs a storage shape warning for a value that should have been an array.
pub(crate) fn warn_shape(key: &str, found: &Value) {
    log::warn!(
        "storage shape warning: key '{key}' holds {} instead of an array; treating it as empty",
        json_kind(found)
    );
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
