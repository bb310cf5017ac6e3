//! Flash file scanner
//!
//! One query per module type plus one over the legacy course file area.
//! Results are merged in memory, deduplicated in first-seen order, then
//! tagged against the set of contexts that ship an HTML5 fallback.

use crate::error::{AuditError, Result};
use crate::inventory::FileInventory;
use crate::patterns::{FilePatterns, HTML5_FALLBACK_FILENAME};
use crate::types::{CandidateHit, ModuleDescriptor};
use apocalypse_db::validate_identifier;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

pub struct Scanner<'a> {
    inventory: &'a dyn FileInventory,
    patterns: FilePatterns,
}

impl<'a> Scanner<'a> {
    pub fn new(inventory: &'a dyn FileInventory) -> Self {
        Self::with_patterns(inventory, FilePatterns::flash())
    }

    pub fn with_patterns(inventory: &'a dyn FileInventory, patterns: FilePatterns) -> Self {
        Self {
            inventory,
            patterns,
        }
    }

    /// Scan every module plus the legacy file area.
    ///
    /// Any inventory error aborts the whole scan.
    pub fn scan(&self, modules: &[ModuleDescriptor]) -> Result<Vec<CandidateHit>> {
        let start = Instant::now();
        let mut hits = Vec::new();

        for module in modules {
            validate_module_name(module)?;
            let module_hits = self.inventory.module_file_hits(module, &self.patterns)?;
            debug!(module = %module.name, hits = module_hits.len(), "Scanned module files");
            hits.extend(module_hits);
        }

        let legacy_hits = self.inventory.course_file_hits(&self.patterns)?;
        debug!(hits = legacy_hits.len(), "Scanned legacy course files");
        hits.extend(legacy_hits);

        let mut hits = dedup_hits(hits);

        let fallback_contexts = self.inventory.contexts_with_file(HTML5_FALLBACK_FILENAME)?;
        let tagged = tag_html5_support(&mut hits, &fallback_contexts);

        info!(
            modules = modules.len(),
            hits = hits.len(),
            html5 = tagged,
            duration_ms = start.elapsed().as_millis() as u64,
            "Flash scan complete"
        );
        Ok(hits)
    }
}

fn validate_module_name(module: &ModuleDescriptor) -> Result<()> {
    validate_identifier(&module.name).map_err(|err| AuditError::InvalidModuleName {
        name: module.name.clone(),
        reason: err.to_string(),
    })
}

/// Drop repeated hits, keeping the first occurrence of each.
pub fn dedup_hits(hits: Vec<CandidateHit>) -> Vec<CandidateHit> {
    let mut seen = HashSet::with_capacity(hits.len());
    let mut unique = Vec::with_capacity(hits.len());
    for hit in hits {
        if seen.insert(hit.dedup_key()) {
            unique.push(hit);
        }
    }
    unique
}

/// Flag every hit whose context is in `fallback_contexts`. Returns how many
/// hits were flagged.
///
/// Membership is not consumed: several hits sharing a context are all flagged.
pub fn tag_html5_support(hits: &mut [CandidateHit], fallback_contexts: &HashSet<i64>) -> usize {
    let mut tagged = 0;
    for hit in hits.iter_mut() {
        if fallback_contexts.contains(&hit.context_id) {
            hit.html5_present = true;
            tagged += 1;
        }
    }
    tagged
}
