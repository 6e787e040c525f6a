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

//! # Data Import Module
//!
//! This module brings export files back into the store.
//!
//! ## Module Components
//!
//! - **Parse** ([parse.rs](parse/index.html)): wrapped versus legacy file
//!   detection and the confirmation preview
//! - **Reconcile** ([reconcile.rs](reconcile/index.html)): append and replace
//!   strategies
//! - **Session** ([session.rs](session/index.html)): the state machine of one
//!   import attempt, including the mandatory pre-import backup
//!
//! ## Usage Patterns
//!
//! ```rust,ignore
//! use rafiq::import::{RfImportSession, RfImportStrategy};
//!
//! let mut session = RfImportSession::new();
//! let preview = session.parse(&bytes, &config)?;
//! println!("{}", preview.confirm_message());
//! session.choose(RfImportStrategy::Append)?;
//! let report = session.commit(&mut store, &config)?;
//! ```

pub mod parse;
pub mod reconcile;
pub mod session;

pub use parse::{parse_import, RfImportPreview, RfParsedImport, RfPreviewKey};
pub use reconcile::{merge_by_id, RfImportStrategy, RfKeyOutcome, RfMergeResult, RfReconciler};
pub use session::{RfImportReport, RfImportSession, RfImportState};
