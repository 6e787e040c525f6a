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

//! # Data Export Module
//!
//! This module turns export packages into downloadable files.
//!
//! ## Module Components
//!
//! - **Writer** ([writer.rs](writer/index.html)): atomic package writing,
//!   file naming and digests
//!
//! ## Usage Patterns
//!
//! ```rust,ignore
//! use rafiq::export::{RfExportWriter, RfWriterConfig};
//!
//! let writer = RfExportWriter::new().with_config(RfWriterConfig {
//!     prefix: "Rafiq_Backup".into(),
//!     ..Default::default()
//! });
//! let stats = writer.write(&package, "full", &dir)?;
//! println!("{} bytes, digest {}", stats.bytes_written, stats.digest);
//! ```

pub mod writer;

pub use writer::{
    compute_digest, export_file_name, RfExportStats, RfExportWriter, RfWriterConfig,
    FULL_SCOPE_TAG,
};
