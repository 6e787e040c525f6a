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

use serde_json::Value;

use crate::errors::Result;

/// Raw string key-value backend.
///
/// Implementations store opaque text. JSON handling lives in [`RfStore`].
pub trait RfStorage {
    /// Returns the stored text for `key`, if any.
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous text.
    fn set_raw(&mut self, key: &str, value: String) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Lists every key currently present.
    fn keys(&self) -> Result<Vec<String>>;
}

impl<S: RfStorage + ?Sized> RfStorage for Box<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        (**self).keys()
    }
}

/// JSON view over an [`RfStorage`] backend.
///
/// Stored text that is empty, `"undefined"` or `"null"` reads as absent.
/// Text that is not valid JSON reads as an opaque string value.
#[derive(Debug, Default)]
pub struct RfStore<S: RfStorage> {
    backend: S,
}

impl<S: RfStorage> RfStore<S> {
    #[allow(non_snake_case)]
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Reads and decodes the value stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw = match self.backend.get_raw(key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        Ok(decode_stored(key, raw))
    }

    /// Encodes `value` as JSON and writes it under `key`.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.backend.set_raw(key, text)
    }

    /// Removes `key` from the backend.
    pub fn remove(&mut self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    /// Lists every key present in the backend, reserved ones included.
    pub fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys()
    }

    /// Whether `key` holds a value after the absence rules are applied.
    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// The raw backend, for reads that must bypass JSON decoding.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutable access to the raw backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Consumes the store and returns its backend.
    pub fn into_backend(self) -> S {
        self.backend
    }
}

/// Applies the absence and fallback rules to one stored text.
pub(crate) fn decode_stored(key: &str, raw: String) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some(value),
        Err(err) => {
            log::debug!("key '{key}' holds non-JSON text, reading it as a string: {err}");
            Some(Value::String(raw))
        }
    }
}
