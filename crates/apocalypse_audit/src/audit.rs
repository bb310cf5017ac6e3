//! One audit run: list modules, scan, commit, apply retention.

use crate::error::Result;
use crate::inventory::{CategoryDirectory, FileInventory, ModuleRegistry};
use crate::persistence::AuditPersistence;
use crate::scanner::Scanner;
use crate::snapshot::SnapshotStore;
use crate::types::RunSummary;
use crate::urls::SiteUrls;
use std::time::Instant;
use tracing::info;

/// Something that can perform a complete audit run.
pub trait AuditRunner {
    fn run(&self) -> Result<RunSummary>;
}

/// The full audit wired to its collaborators.
pub struct FlashAudit<'a> {
    registry: &'a dyn ModuleRegistry,
    inventory: &'a dyn FileInventory,
    categories: &'a dyn CategoryDirectory,
    persistence: &'a dyn AuditPersistence,
    urls: SiteUrls,
    keep_last: Option<u64>,
}

impl<'a> FlashAudit<'a> {
    pub fn new(
        registry: &'a dyn ModuleRegistry,
        inventory: &'a dyn FileInventory,
        categories: &'a dyn CategoryDirectory,
        persistence: &'a dyn AuditPersistence,
        urls: SiteUrls,
    ) -> Self {
        Self {
            registry,
            inventory,
            categories,
            persistence,
            urls,
            keep_last: None,
        }
    }

    /// Prune run history to the newest `keep_last` runs after each commit.
    pub fn with_retention(mut self, keep_last: Option<u64>) -> Self {
        self.keep_last = keep_last;
        self
    }

    pub fn snapshot(&self) -> SnapshotStore<'_> {
        SnapshotStore::new(self.persistence, self.categories, &self.urls)
    }

    /// Run with an explicit timestamp (unix seconds).
    pub fn run_at(&self, run_at: i64) -> Result<RunSummary> {
        let start = Instant::now();
        let modules = self.registry.modules()?;
        info!(modules = modules.len(), "Starting Flash audit");

        let hits = Scanner::new(self.inventory).scan(&modules)?;
        let summary = self.snapshot().commit_at(&hits, run_at)?;

        if let Some(keep_last) = self.keep_last {
            self.persistence.prune_runs(keep_last)?;
        }

        info!(
            count = summary.count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Flash audit complete"
        );
        Ok(summary)
    }
}

impl AuditRunner for FlashAudit<'_> {
    fn run(&self) -> Result<RunSummary> {
        self.run_at(chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::FilePatterns;
    use crate::types::{
        ActivityKind, AuditRecord, AuditRun, CandidateHit, ModuleDescriptor, PendingRecord,
        SortOrder,
    };
    use std::cell::{Cell, RefCell};
    use std::collections::{HashMap, HashSet};

    struct Host;

    impl ModuleRegistry for Host {
        fn modules(&self) -> Result<Vec<ModuleDescriptor>> {
            Ok(vec![ModuleDescriptor::new(1, "scorm")])
        }
    }

    impl FileInventory for Host {
        fn module_file_hits(
            &self,
            module: &ModuleDescriptor,
            _patterns: &FilePatterns,
        ) -> Result<Vec<CandidateHit>> {
            Ok(vec![CandidateHit {
                context_id: 100,
                course_id: 2,
                course_full_name: "Physics 101".to_string(),
                category_path: "/5".to_string(),
                kind: ActivityKind::Module(module.name.clone()),
                activity_instance_id: 7,
                activity_name: "Pendulum".to_string(),
                html5_present: false,
            }])
        }

        fn course_file_hits(&self, _patterns: &FilePatterns) -> Result<Vec<CandidateHit>> {
            Ok(Vec::new())
        }

        fn contexts_with_file(&self, _filename: &str) -> Result<HashSet<i64>> {
            Ok(HashSet::from([100]))
        }
    }

    impl CategoryDirectory for Host {
        fn category_names(&self) -> Result<HashMap<i64, String>> {
            Ok(HashMap::from([(5, "Science".to_string())]))
        }
    }

    #[derive(Default)]
    struct Recorder {
        committed: RefCell<Vec<PendingRecord>>,
        pruned_with: Cell<Option<u64>>,
    }

    impl AuditPersistence for Recorder {
        fn replace_snapshot(&self, records: &[PendingRecord], run_at: i64) -> Result<RunSummary> {
            *self.committed.borrow_mut() = records.to_vec();
            Ok(RunSummary {
                count: records.len() as u64,
                run_at,
            })
        }

        fn list_page(&self, _offset: u64, _limit: u64, _sort: SortOrder) -> Result<Vec<AuditRecord>> {
            Ok(Vec::new())
        }

        fn count(&self) -> Result<u64> {
            Ok(self.committed.borrow().len() as u64)
        }

        fn last_run(&self) -> Result<Option<AuditRun>> {
            Ok(None)
        }

        fn list_runs(&self, _limit: u64) -> Result<Vec<AuditRun>> {
            Ok(Vec::new())
        }

        fn prune_runs(&self, keep_last: u64) -> Result<u64> {
            self.pruned_with.set(Some(keep_last));
            Ok(0)
        }
    }

    #[test]
    fn run_scans_tags_and_commits() {
        let recorder = Recorder::default();
        let urls = SiteUrls::new("http://lms.test").unwrap();
        let audit = FlashAudit::new(&Host, &Host, &Host, &recorder, urls);

        let summary = audit.run_at(1_000).unwrap();

        assert_eq!(summary, RunSummary { count: 1, run_at: 1_000 });
        let committed = recorder.committed.borrow();
        assert_eq!(committed[0].category, "Science");
        assert!(committed[0].html5_present);
        assert_eq!(committed[0].activity_url, "http://lms.test/mod/scorm/view.php?id=7");
        assert_eq!(recorder.pruned_with.get(), None);
    }

    #[test]
    fn retention_prunes_after_commit() {
        let recorder = Recorder::default();
        let urls = SiteUrls::new("http://lms.test").unwrap();
        let audit =
            FlashAudit::new(&Host, &Host, &Host, &recorder, urls).with_retention(Some(30));

        audit.run().unwrap();
        assert_eq!(recorder.pruned_with.get(), Some(30));
    }
}
