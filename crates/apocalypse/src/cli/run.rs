//! Run command - one audit under the run lock

use super::context::{CliContext, GlobalArgs};
use super::output::{format_timestamp, print_json};
use anyhow::{Context, Result};
use apocalypse_audit::{AuditRunner, FlashAudit, RunSummary};
use serde::Serialize;

pub const RUN_LOCK_PURPOSE: &str = "apocalypse run";

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Output the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct RunOutput {
    count: u64,
    run_at: i64,
    database: String,
}

pub fn run(global: &GlobalArgs, args: RunArgs) -> Result<()> {
    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let _lock = ctx.lock(RUN_LOCK_PURPOSE)?;

    let summary = run_once(&ctx, &conn)?;

    if args.json {
        return print_json(&RunOutput {
            count: summary.count,
            run_at: summary.run_at,
            database: ctx.db_path.display().to_string(),
        });
    }

    println!(
        "Audit complete at {}: {} Flash {} found",
        format_timestamp(summary.run_at),
        summary.count,
        if summary.count == 1 { "activity" } else { "activities" }
    );
    Ok(())
}

/// Wire the SQLite collaborators and run one audit. Caller holds the lock.
pub fn run_once(ctx: &CliContext, conn: &apocalypse_db::DbConnection) -> Result<RunSummary> {
    let host = ctx.open_host(conn)?;
    let store = ctx.open_store(conn)?;
    let urls = ctx.config.site_urls()?;

    FlashAudit::new(&host, &host, &host, &store, urls)
        .with_retention(ctx.config.run_history.keep_last)
        .run()
        .context("Flash audit failed")
}
