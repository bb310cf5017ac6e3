//! History commands - list and prune past audit runs

use super::context::{CliContext, GlobalArgs};
use super::output::{format_timestamp, print_json, print_table};
use anyhow::Result;
use apocalypse_audit::AuditPersistence;
use tracing::info;

pub const PRUNE_LOCK_PURPOSE: &str = "apocalypse prune-history";

#[derive(Debug, clap::Args)]
pub struct HistoryArgs {
    /// Maximum runs to show (0 for all)
    #[arg(long, default_value_t = 20)]
    pub limit: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args)]
pub struct PruneArgs {
    /// Number of newest runs to keep
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub keep: u64,
}

pub fn run(global: &GlobalArgs, args: HistoryArgs) -> Result<()> {
    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let store = ctx.open_store(&conn)?;
    let runs = store.list_runs(args.limit)?;

    if args.json {
        return print_json(&runs);
    }

    if runs.is_empty() {
        println!("No audit runs recorded.");
        return Ok(());
    }

    let rows = runs
        .iter()
        .map(|run| {
            vec![
                run.id.to_string(),
                format_timestamp(run.run_at),
                run.flash_activity_count.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "Run at", "Flash activities"], rows);
    Ok(())
}

pub fn run_prune(global: &GlobalArgs, args: PruneArgs) -> Result<()> {
    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let _lock = ctx.lock(PRUNE_LOCK_PURPOSE)?;
    let store = ctx.open_store(&conn)?;

    let removed = store.prune_runs(args.keep)?;
    info!(removed, keep = args.keep, "Pruned run history");
    println!(
        "Removed {} audit {}; {} kept",
        removed,
        if removed == 1 { "run" } else { "runs" },
        store.list_runs(0)?.len()
    );
    Ok(())
}
