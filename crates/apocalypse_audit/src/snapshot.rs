//! Snapshot store
//!
//! Turns scan hits into report rows and swaps them in as the current
//! snapshot. The swap and the run-history append are one transaction in the
//! persistence layer.

use crate::category::resolve_category_path;
use crate::error::Result;
use crate::inventory::CategoryDirectory;
use crate::persistence::AuditPersistence;
use crate::types::{AuditRecord, AuditRun, CandidateHit, PendingRecord, RunSummary, SortOrder};
use crate::urls::SiteUrls;
use chrono::Utc;
use std::collections::HashMap;
use tracing::info;

pub struct SnapshotStore<'a> {
    persistence: &'a dyn AuditPersistence,
    categories: &'a dyn CategoryDirectory,
    urls: &'a SiteUrls,
}

impl<'a> SnapshotStore<'a> {
    pub fn new(
        persistence: &'a dyn AuditPersistence,
        categories: &'a dyn CategoryDirectory,
        urls: &'a SiteUrls,
    ) -> Self {
        Self {
            persistence,
            categories,
            urls,
        }
    }

    /// Replace the snapshot with `hits`, stamped with the current time.
    pub fn commit(&self, hits: &[CandidateHit]) -> Result<RunSummary> {
        self.commit_at(hits, Utc::now().timestamp())
    }

    /// Replace the snapshot with `hits`, stamped `run_at` (unix seconds).
    ///
    /// On error nothing changes: the previous rows and run history remain.
    pub fn commit_at(&self, hits: &[CandidateHit], run_at: i64) -> Result<RunSummary> {
        let names = self.categories.category_names()?;
        let records = build_records(hits, &names, self.urls)?;
        let summary = self.persistence.replace_snapshot(&records, run_at)?;
        info!(count = summary.count, run_at = summary.run_at, "Committed audit snapshot");
        Ok(summary)
    }

    pub fn list_page(&self, offset: u64, limit: u64, sort: SortOrder) -> Result<Vec<AuditRecord>> {
        self.persistence.list_page(offset, limit, sort)
    }

    pub fn count(&self) -> Result<u64> {
        self.persistence.count()
    }

    pub fn last_run(&self) -> Result<Option<AuditRun>> {
        self.persistence.last_run()
    }
}

/// Resolve categories and links for each hit, preserving order.
pub fn build_records(
    hits: &[CandidateHit],
    category_names: &HashMap<i64, String>,
    urls: &SiteUrls,
) -> Result<Vec<PendingRecord>> {
    hits.iter()
        .map(|hit| {
            Ok(PendingRecord {
                category: resolve_category_path(&hit.category_path, category_names),
                course_full_name: hit.course_full_name.clone(),
                course_url: urls.course_url(hit.course_id)?,
                activity_type: hit.kind.clone(),
                activity_name: hit.activity_name.clone(),
                activity_url: urls.activity_url(
                    &hit.kind,
                    hit.activity_instance_id,
                    hit.context_id,
                )?,
                html5_present: hit.html5_present,
            })
        })
        .collect()
}
