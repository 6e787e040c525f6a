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

//! # Snapshot Module
//!
//! Captures store contents into transportable form.
//!
//! ## Module Components
//!
//! - **Filter** ([filter.rs](filter/index.html)): export scopes and the
//!   per-key rules that narrow collections under a scope
//! - **Package** ([package.rs](package/index.html)): the export package file
//!   format
//!
//! Managed-key snapshots feed exports. Raw whole-store snapshots feed the
//! backup history and include keys outside the managed set.

pub mod filter;
pub mod package;

pub use filter::{apply_scope, rule_for, RfExportScope, RfFieldEquals};
pub use package::{now_millis, RfExportPackage, RfPayload};

use serde_json::{Map, Value};

use crate::config::RfConfig;
use crate::errors::Result;
use crate::record::RfCollections;
use crate::store::adapter::decode_stored;
use crate::store::{RfStorage, RfStore};

/// Reads managed keys and raw store contents into snapshots.
pub struct RfSnapshotEngine<'a, S: RfStorage> {
    store: &'a RfStore<S>,
    config: &'a RfConfig,
}

impl<'a, S: RfStorage> RfSnapshotEngine<'a, S> {
    #[allow(non_snake_case)]
    pub fn new(store: &'a RfStore<S>, config: &'a RfConfig) -> Self {
        Self { store, config }
    }

    /// Copies every managed key as-is, in managed-key order.
    ///
    /// Absent collections are exported as `[]` and absent configuration
    /// values as `null`, so the payload always lists the whole managed set.
    pub fn snapshot_full(&self) -> Result<RfPayload> {
        let collections = RfCollections::new(self.store);
        let mut payload = RfPayload::new();
        for key in &self.config.managed_keys {
            payload.insert(key.name.clone(), collections.read_managed(key)?);
        }
        Ok(payload)
    }

    /// Copies every managed key, narrowing those with a rule for `scope`.
    pub fn snapshot_filtered(&self, scope: &RfExportScope) -> Result<RfPayload> {
        let full = self.snapshot_full()?;
        Ok(full
            .into_iter()
            .map(|(key, value)| {
                let narrowed = apply_scope(&key, value, scope);
                (key, narrowed)
            })
            .collect())
    }

    /// Wraps a payload into a package stamped with the current time.
    pub fn build_package(&self, source_user: &str, payload: RfPayload) -> RfExportPackage {
        RfExportPackage::new(source_user, payload)
            .with_format_version(self.config.format_version.clone())
    }

    /// Decodes every non-reserved store key, including unmanaged ones.
    ///
    /// Undecodable text is kept as a string. Sentinel texts are kept as null
    /// so a restore writes back the same key set.
    pub fn snapshot_store(&self) -> Result<Map<String, Value>> {
        let backend = self.store.backend();
        let mut data = Map::new();
        for key in backend.keys()? {
            if self.config.is_reserved(&key) {
                continue;
            }
            let Some(raw) = backend.get_raw(&key)? else {
                continue;
            };
            let value = decode_stored(&key, raw).unwrap_or(Value::Null);
            data.insert(key, value);
        }
        Ok(data)
    }
}
