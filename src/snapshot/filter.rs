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

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Result, RfError};
use crate::record::{record_str, RfCollection};

/// Narrowing applied to a filtered export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "camelCase")]
pub enum RfExportScope {
    /// Records belonging to one teacher id.
    ByTeacher(String),
    /// Records belonging to one school name.
    BySchool(String),
    /// Reports of one evaluation type.
    ByReportType(String),
}

impl RfExportScope {
    /// Builds a scope from the UI's tag (`teacher`, `school`, `type`) and target.
    pub fn from_tag(tag: &str, target: &str) -> Result<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(RfError::validation(format!(
                "export scope '{tag}' requires a target"
            )));
        }
        match tag {
            "teacher" => Ok(Self::ByTeacher(target.to_string())),
            "school" => Ok(Self::BySchool(target.to_string())),
            "type" => Ok(Self::ByReportType(target.to_string())),
            other => Err(RfError::validation(format!("unknown export scope '{other}'"))),
        }
    }

    /// Tag used in export file names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ByTeacher(_) => "teacher",
            Self::BySchool(_) => "school",
            Self::ByReportType(_) => "type",
        }
    }

    /// The teacher id, school name or report type the scope selects.
    pub fn target(&self) -> &str {
        match self {
            Self::ByTeacher(target) | Self::BySchool(target) | Self::ByReportType(target) => target,
        }
    }

    fn kind(&self) -> RfScopeKind {
        match self {
            Self::ByTeacher(_) => RfScopeKind::Teacher,
            Self::BySchool(_) => RfScopeKind::School,
            Self::ByReportType(_) => RfScopeKind::ReportType,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RfScopeKind {
    Teacher,
    School,
    ReportType,
}

/// Declares which record field narrows a managed key under a scope kind.
#[derive(Debug)]
struct RfFilterRule {
    key: &'static str,
    kind: RfScopeKind,
    field: &'static str,
}

const FILTER_RULES: &[RfFilterRule] = &[
    RfFilterRule { key: "teachers", kind: RfScopeKind::Teacher, field: "id" },
    RfFilterRule { key: "teachers", kind: RfScopeKind::School, field: "schoolName" },
    RfFilterRule { key: "reports", kind: RfScopeKind::Teacher, field: "teacherId" },
    RfFilterRule { key: "reports", kind: RfScopeKind::School, field: "school" },
    RfFilterRule { key: "reports", kind: RfScopeKind::ReportType, field: "evaluationType" },
    RfFilterRule { key: "schools", kind: RfScopeKind::School, field: "name" },
];

/// Keeps records whose string field equals a target.
#[derive(Debug)]
pub struct RfFieldEquals<'a> {
    field: &'a str,
    target: &'a str,
}

impl<'a> RfFieldEquals<'a> {
    #[allow(non_snake_case)]
    pub fn new(field: &'a str, target: &'a str) -> Self {
        Self { field, target }
    }

    /// Whether the record's field holds exactly the target string.
    pub fn matches(&self, record: &Value) -> bool {
        record_str(record, self.field) == Some(self.target)
    }

    /// Keeps matching records in their original order.
    pub fn apply(&self, records: RfCollection) -> RfCollection {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Returns the field predicate narrowing `key` under `scope`, if a rule exists.
pub fn rule_for<'a>(key: &str, scope: &'a RfExportScope) -> Option<RfFieldEquals<'a>> {
    let kind = scope.kind();
    FILTER_RULES
        .iter()
        .find(|rule| rule.key == key && rule.kind == kind)
        .map(|rule| RfFieldEquals::new(rule.field, scope.target()))
}

/// Applies the rule for `key` to a stored value.
///
/// Values without a rule, and non-array values, pass through unchanged.
pub fn apply_scope(key: &str, value: Value, scope: &RfExportScope) -> Value {
    match (rule_for(key, scope), value) {
        (Some(rule), Value::Array(records)) => Value::Array(rule.apply(records)),
        (_, value) => value,
    }
}
