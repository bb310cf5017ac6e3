//! Periodic re-audit.

use crate::audit::AuditRunner;
use crate::error::Result;
use crate::types::RunSummary;
use apocalypse_db::try_lock_exclusive;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

pub const SCHEDULED_AUDIT_NAME: &str = "Scheduled Flash audit";

/// Upper bound on how long a shutdown request can go unnoticed.
const SHUTDOWN_POLL: Duration = Duration::from_secs(1);

/// A named unit of work the scheduler can invoke.
pub trait ScheduledTask {
    fn name(&self) -> &str;
    fn execute(&mut self) -> Result<()>;
}

/// The audit as a scheduled task.
pub struct ScheduledAudit<A: AuditRunner> {
    audit: A,
    lock_db_path: Option<PathBuf>,
    last_summary: Option<RunSummary>,
}

impl<A: AuditRunner> ScheduledAudit<A> {
    pub fn new(audit: A) -> Self {
        Self {
            audit,
            lock_db_path: None,
            last_summary: None,
        }
    }

    /// Hold the run lock for `db_path` around each execution.
    pub fn with_run_lock(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.lock_db_path = Some(db_path.into());
        self
    }

    pub fn last_summary(&self) -> Option<RunSummary> {
        self.last_summary
    }
}

impl<A: AuditRunner> ScheduledTask for ScheduledAudit<A> {
    fn name(&self) -> &str {
        SCHEDULED_AUDIT_NAME
    }

    fn execute(&mut self) -> Result<()> {
        let _guard = match &self.lock_db_path {
            Some(path) => Some(try_lock_exclusive(path, SCHEDULED_AUDIT_NAME)?),
            None => None,
        };
        let summary = self.audit.run()?;
        self.last_summary = Some(summary);
        Ok(())
    }
}

/// Totals from one scheduler session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerReport {
    pub runs: u64,
    pub failures: u64,
}

/// Runs a task immediately and then once per interval until shut down.
pub struct IntervalScheduler {
    interval: Duration,
    max_runs: Option<u64>,
    shutdown: Arc<AtomicBool>,
}

impl IntervalScheduler {
    pub fn new(interval: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            interval,
            max_runs: None,
            shutdown,
        }
    }

    /// Stop after this many executions, successful or not.
    pub fn with_max_runs(mut self, max_runs: Option<u64>) -> Self {
        self.max_runs = max_runs;
        self
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Failures are logged and retried on the next tick.
    pub fn run(&self, task: &mut dyn ScheduledTask) -> SchedulerReport {
        let mut report = SchedulerReport::default();
        info!(
            task = task.name(),
            interval_secs = self.interval.as_secs(),
            "Scheduler started"
        );

        while !self.shutdown_requested() {
            let started = Instant::now();
            match task.execute() {
                Ok(()) => info!(task = task.name(), "Task finished"),
                Err(err) => {
                    report.failures += 1;
                    error!(task = task.name(), "Task failed: {}", err);
                }
            }
            report.runs += 1;

            if self.max_runs.is_some_and(|max| report.runs >= max) {
                break;
            }
            self.sleep_until(started + self.interval);
        }

        info!(
            runs = report.runs,
            failures = report.failures,
            "Scheduler stopped"
        );
        report
    }

    fn sleep_until(&self, deadline: Instant) {
        loop {
            if self.shutdown_requested() {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            std::thread::sleep(remaining.min(SHUTDOWN_POLL));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use std::cell::Cell;

    struct CountingTask {
        calls: u64,
        fail_on: Option<u64>,
        stop_after: Option<(u64, Arc<AtomicBool>)>,
    }

    impl CountingTask {
        fn new() -> Self {
            Self {
                calls: 0,
                fail_on: None,
                stop_after: None,
            }
        }
    }

    impl ScheduledTask for CountingTask {
        fn name(&self) -> &str {
            "counting"
        }

        fn execute(&mut self) -> Result<()> {
            self.calls += 1;
            if let Some((n, flag)) = &self.stop_after {
                if self.calls >= *n {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            if self.fail_on == Some(self.calls) {
                return Err(AuditError::Config("boom".to_string()));
            }
            Ok(())
        }
    }

    struct FixedAudit {
        runs: Cell<u64>,
    }

    impl AuditRunner for FixedAudit {
        fn run(&self) -> Result<RunSummary> {
            self.runs.set(self.runs.get() + 1);
            Ok(RunSummary {
                count: 4,
                run_at: 99,
            })
        }
    }

    #[test]
    fn stops_at_max_runs() {
        let scheduler = IntervalScheduler::new(Duration::ZERO, Arc::new(AtomicBool::new(false)))
            .with_max_runs(Some(3));
        let mut task = CountingTask::new();

        let report = scheduler.run(&mut task);
        assert_eq!(report, SchedulerReport { runs: 3, failures: 0 });
        assert_eq!(task.calls, 3);
    }

    #[test]
    fn failures_do_not_stop_the_loop() {
        let scheduler = IntervalScheduler::new(Duration::ZERO, Arc::new(AtomicBool::new(false)))
            .with_max_runs(Some(3));
        let mut task = CountingTask::new();
        task.fail_on = Some(2);

        let report = scheduler.run(&mut task);
        assert_eq!(report, SchedulerReport { runs: 3, failures: 1 });
    }

    #[test]
    fn shutdown_flag_ends_long_sleep() {
        let shutdown = Arc::new(AtomicBool::new(false));
        let scheduler = IntervalScheduler::new(Duration::from_secs(3600), shutdown.clone());
        let mut task = CountingTask::new();
        task.stop_after = Some((1, shutdown));

        let started = Instant::now();
        let report = scheduler.run(&mut task);
        assert_eq!(report.runs, 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn already_shut_down_runs_nothing() {
        let scheduler = IntervalScheduler::new(Duration::ZERO, Arc::new(AtomicBool::new(true)));
        let mut task = CountingTask::new();
        assert_eq!(scheduler.run(&mut task).runs, 0);
    }

    #[test]
    fn scheduled_audit_records_summary() {
        let mut task = ScheduledAudit::new(FixedAudit { runs: Cell::new(0) });
        assert_eq!(task.name(), "Scheduled Flash audit");

        task.execute().unwrap();
        assert_eq!(task.last_summary(), Some(RunSummary { count: 4, run_at: 99 }));
    }

    #[test]
    fn scheduled_audit_fails_when_lock_is_held() {
        let tmp = tempfile::TempDir::new().unwrap();
        let db_path = tmp.path().join("audit.sqlite3");
        let _held = try_lock_exclusive(&db_path, "test").unwrap();

        let mut task =
            ScheduledAudit::new(FixedAudit { runs: Cell::new(0) }).with_run_lock(&db_path);
        assert!(matches!(task.execute(), Err(AuditError::Lock(_))));
        assert_eq!(task.audit.runs.get(), 0);
    }
}
