//! Schedule command - periodic re-audit until SIGINT/SIGTERM

use super::context::{CliContext, GlobalArgs};
use anyhow::{Context, Result};
use apocalypse_audit::{AuditRunner, FlashAudit, IntervalScheduler, RunSummary, ScheduledAudit};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, clap::Args)]
pub struct ScheduleArgs {
    /// Seconds between audits (default: schedule.interval_secs from config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_secs: Option<u64>,

    /// Stop after this many audits
    #[arg(long)]
    pub max_runs: Option<u64>,
}

/// Opens its collaborators per run so a fresh connection sees host changes
/// made between ticks.
struct SqliteAudit<'a> {
    ctx: &'a CliContext,
}

impl AuditRunner for SqliteAudit<'_> {
    fn run(&self) -> apocalypse_audit::Result<RunSummary> {
        let conn = apocalypse_db::DbConnection::open_existing(&self.ctx.db_path)?;
        let host = apocalypse_audit::SqliteHost::new(conn.clone(), &self.ctx.config.table_prefix)?;
        let store =
            apocalypse_audit::SqliteAuditStore::open(conn, &self.ctx.config.table_prefix)?;
        FlashAudit::new(&host, &host, &host, &store, self.ctx.config.site_urls()?)
            .with_retention(self.ctx.config.run_history.keep_last)
            .run()
    }
}

pub fn run(global: &GlobalArgs, args: ScheduleArgs) -> Result<()> {
    let ctx = CliContext::load(global)?;
    // Fail early on a missing database rather than on the first tick.
    drop(ctx.open_db()?);

    let interval_secs = args
        .interval_secs
        .unwrap_or(ctx.config.schedule.interval_secs);
    let interval = Duration::from_secs(interval_secs);
    let shutdown = install_shutdown_handler()?;

    let mut task = ScheduledAudit::new(SqliteAudit { ctx: &ctx }).with_run_lock(&ctx.db_path);
    let report = IntervalScheduler::new(interval, shutdown)
        .with_max_runs(args.max_runs)
        .run(&mut task);

    println!(
        "Scheduler stopped after {} {} ({} failed)",
        report.runs,
        if report.runs == 1 { "run" } else { "runs" },
        report.failures
    );
    if let Some(summary) = task.last_summary() {
        println!("Last audit found {} Flash activities", summary.count);
    }
    Ok(())
}

/// Set a shared flag on SIGINT/SIGTERM (Ctrl+C on Windows).
fn install_shutdown_handler() -> Result<Arc<AtomicBool>> {
    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let shutdown_flag_handler = shutdown_flag.clone();

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("Failed to install signal handlers")?;
        std::thread::spawn(move || {
            if let Some(sig) = signals.forever().next() {
                info!("Received signal {}, shutting down...", sig);
                shutdown_flag_handler.store(true, Ordering::SeqCst);
            }
        });
    }

    #[cfg(windows)]
    {
        ctrlc::set_handler(move || {
            info!("Received Ctrl+C, shutting down...");
            shutdown_flag_handler.store(true, Ordering::SeqCst);
        })
        .context("Failed to install Ctrl+C handler")?;
    }

    Ok(shutdown_flag)
}
