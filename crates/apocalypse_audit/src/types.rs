//! Core types for the audit
//!
//! A scan produces [`CandidateHit`]s. Committing them turns each into a
//! persisted [`AuditRecord`] and appends one [`AuditRun`].

use crate::error::AuditError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const LEGACY_KIND: &str = "legacy";

// ============================================================================
// Scan Types
// ============================================================================

/// A registered content-module type, e.g. `scorm` or `resource`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: i64,
    pub name: String,
}

impl ModuleDescriptor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// File-store component owning this module's files (`mod_<name>`).
    pub fn component(&self) -> String {
        format!("mod_{}", self.name)
    }
}

/// Where a Flash file was found.
///
/// Persisted as the module short name or the literal `legacy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// File owned by an activity of this module type.
    Module(String),
    /// File in the course-level legacy file area.
    Legacy,
}

impl ActivityKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityKind::Module(name) => name,
            ActivityKind::Legacy => LEGACY_KIND,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ActivityKind {
    fn from(value: &str) -> Self {
        if value == LEGACY_KIND {
            ActivityKind::Legacy
        } else {
            ActivityKind::Module(value.to_string())
        }
    }
}

impl Serialize for ActivityKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ActivityKind::from(s.as_str()))
    }
}

/// One Flash file hit joined to its course, category and activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHit {
    pub context_id: i64,
    pub course_id: i64,
    pub course_full_name: String,
    /// Raw `/`-delimited category id chain, e.g. `/5/12`.
    pub category_path: String,
    pub kind: ActivityKind,
    /// Course-module id for module hits; course id for legacy hits.
    pub activity_instance_id: i64,
    pub activity_name: String,
    pub html5_present: bool,
}

impl CandidateHit {
    /// Identity used to collapse duplicate hits from multiple matching files.
    pub(crate) fn dedup_key(&self) -> (i64, i64, String, i64, String) {
        (
            self.context_id,
            self.course_id,
            self.kind.as_str().to_string(),
            self.activity_instance_id,
            self.activity_name.clone(),
        )
    }
}

// ============================================================================
// Persisted Types
// ============================================================================

/// An audit row ready to insert (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingRecord {
    pub category: String,
    pub course_full_name: String,
    pub course_url: String,
    pub activity_type: ActivityKind,
    pub activity_name: String,
    pub activity_url: String,
    pub html5_present: bool,
}

/// A persisted audit row from the most recent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub category: String,
    pub course_full_name: String,
    pub course_url: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityKind,
    pub activity_name: String,
    pub activity_url: String,
    pub html5_present: bool,
}

/// One completed audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRun {
    pub id: i64,
    /// Unix seconds.
    pub run_at: i64,
    pub flash_activity_count: u64,
}

impl AuditRun {
    pub fn run_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.run_at, 0)
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub count: u64,
    /// Unix seconds.
    pub run_at: i64,
}

// ============================================================================
// Read Path
// ============================================================================

/// Whitelisted sort columns for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    /// Insertion order.
    #[default]
    Id,
    Category,
    Course,
    Type,
    Activity,
    Html5Present,
}

impl SortColumn {
    /// Column name in the audit table.
    pub fn column_name(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Category => "category",
            SortColumn::Course => "coursefullname",
            SortColumn::Type => "type",
            SortColumn::Activity => "activityname",
            SortColumn::Html5Present => "html5present",
        }
    }
}

impl FromStr for SortColumn {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" => Ok(SortColumn::Id),
            "category" => Ok(SortColumn::Category),
            "course" | "coursefullname" => Ok(SortColumn::Course),
            "type" => Ok(SortColumn::Type),
            "activity" | "activityname" => Ok(SortColumn::Activity),
            "html5" | "html5present" => Ok(SortColumn::Html5Present),
            other => Err(AuditError::InvalidSort(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortOrder {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: SortColumn) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}
