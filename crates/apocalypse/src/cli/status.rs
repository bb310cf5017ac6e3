//! Status command - last run, record count and days remaining

use super::context::{CliContext, GlobalArgs};
use super::output::{format_timestamp, print_json};
use anyhow::Result;
use apocalypse_logging::logs_dir;
use apocalypse_audit::report::{banner, days_remaining, last_audit_line};
use apocalypse_audit::{AuditPersistence, AuditRun};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, clap::Args)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusOutput {
    database: String,
    config: String,
    logs: String,
    site_url: String,
    cutoff_date: String,
    days_remaining: i64,
    record_count: u64,
    last_run: Option<AuditRun>,
}

pub fn run(global: &GlobalArgs, args: StatusArgs) -> Result<()> {
    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let store = ctx.open_store(&conn)?;

    let now = Utc::now();
    let days = days_remaining(ctx.config.cutoff(), now);
    let last_run = store.last_run()?;
    let record_count = store.count()?;

    if args.json {
        return print_json(&StatusOutput {
            database: ctx.db_path.display().to_string(),
            config: ctx.config_path.display().to_string(),
            logs: logs_dir().display().to_string(),
            site_url: ctx.config.site_url.clone(),
            cutoff_date: ctx.config.cutoff_date.to_string(),
            days_remaining: days,
            record_count,
            last_run,
        });
    }

    println!("{}", banner(days));
    println!("{}", last_audit_line(last_run.as_ref(), now));
    if let Some(run) = &last_run {
        println!("  Run at:   {}", format_timestamp(run.run_at));
        println!("  Found:    {}", run.flash_activity_count);
    }
    println!("Records:    {}", record_count);
    println!("Database:   {}", ctx.db_path.display());
    println!("Config:     {}", ctx.config_path.display());
    Ok(())
}
