//! Read-only views of the host platform the scanner depends on.

use crate::error::Result;
use crate::patterns::FilePatterns;
use crate::types::{CandidateHit, ModuleDescriptor};
use std::collections::{HashMap, HashSet};

/// Lists the installed content-module types.
pub trait ModuleRegistry {
    fn modules(&self) -> Result<Vec<ModuleDescriptor>>;
}

/// Queries over the host's stored-file inventory.
pub trait FileInventory {
    /// Hits for files owned by activities of `module` whose name matches
    /// `patterns`, one per distinct (context, course, activity). Hits carry
    /// `html5_present = false`.
    fn module_file_hits(
        &self,
        module: &ModuleDescriptor,
        patterns: &FilePatterns,
    ) -> Result<Vec<CandidateHit>>;

    /// Hits for matching files in course-level legacy file areas.
    fn course_file_hits(&self, patterns: &FilePatterns) -> Result<Vec<CandidateHit>>;

    /// Ids of every context holding a file named exactly `filename`.
    fn contexts_with_file(&self, filename: &str) -> Result<HashSet<i64>>;
}

/// Category id to display name lookup.
pub trait CategoryDirectory {
    fn category_names(&self) -> Result<HashMap<i64, String>>;
}
