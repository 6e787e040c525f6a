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

//! # Key-Value Store Module
//!
//! Rafiq keeps all application state as JSON text under named string keys.
//! This module separates the raw backend from the JSON view of it.
//!
//! ## Module Components
//!
//! - **Adapter** ([adapter.rs](adapter/index.html)): [`RfStorage`] backend
//!   trait and the [`RfStore`] JSON adapter with absence rules
//! - **Memory** ([memory.rs](memory/index.html)): ordered in-memory backend
//! - **File** ([file.rs](file/index.html)): single JSON file backend with
//!   atomic persistence
//!
//! ## Usage
//!
//! ```rust
//! use rafiq::store::{RfMemoryStorage, RfStore};
//! use serde_json::json;
//!
//! # fn main() -> rafiq::errors::Result<()> {
//! let mut store = RfStore::new(RfMemoryStorage::new());
//! store.set("teachers", &json!([{"id": "t1"}]))?;
//! assert_eq!(store.get("teachers")?, Some(json!([{"id": "t1"}])));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod file;
pub mod memory;

pub use adapter::{RfStorage, RfStore};
pub use file::{RfFileStorage, RfFilePersistOptions};
pub use memory::RfMemoryStorage;
