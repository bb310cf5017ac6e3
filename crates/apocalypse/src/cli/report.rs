//! Report command - countdown banner, last audit and a page of findings

use super::context::{CliContext, GlobalArgs};
use super::error::HelpfulError;
use super::output::{print_json, print_table};
use anyhow::Result;
use apocalypse_audit::report::{
    banner, days_remaining, last_audit_line, table_row, Pagination, DESCRIPTION,
    EMPTY_STATE_MESSAGE, TABLE_HEADERS,
};
use apocalypse_audit::{AuditPersistence, AuditRecord, AuditRun, SortColumn, SortOrder};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Rows per page (default: per_page from config)
    #[arg(long)]
    pub per_page: Option<u64>,

    /// Sort column: id, category, course, type, activity, html5
    #[arg(long, default_value = "id")]
    pub sort: String,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ReportOutput {
    banner: String,
    days_remaining: i64,
    last_run: Option<AuditRun>,
    total: u64,
    page: u64,
    per_page: u64,
    page_count: u64,
    records: Vec<AuditRecord>,
}

pub fn run(global: &GlobalArgs, args: ReportArgs) -> Result<()> {
    let column: SortColumn = args
        .sort
        .parse()
        .map_err(|_| HelpfulError::invalid_sort(&args.sort))?;
    let sort = if args.desc {
        SortOrder::desc(column)
    } else {
        SortOrder::asc(column)
    };

    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let store = ctx.open_store(&conn)?;

    let pagination = Pagination::new(
        args.page - 1,
        args.per_page.unwrap_or(ctx.config.per_page),
    );
    let now = Utc::now();
    let days = days_remaining(ctx.config.cutoff(), now);
    let last_run = store.last_run()?;
    let total = store.count()?;
    let records = store.list_page(pagination.offset(), pagination.limit(), sort)?;

    if args.json {
        return print_json(&ReportOutput {
            banner: banner(days),
            days_remaining: days,
            last_run,
            total,
            page: args.page,
            per_page: pagination.per_page,
            page_count: pagination.page_count(total),
            records,
        });
    }

    println!("{}", banner(days));
    println!();
    println!("{}", DESCRIPTION);
    println!();
    println!("{}", last_audit_line(last_run.as_ref(), now));
    if last_run.is_none() {
        return Ok(());
    }

    println!();
    if total == 0 {
        println!("{}", EMPTY_STATE_MESSAGE);
        return Ok(());
    }

    print_table(&TABLE_HEADERS, records.iter().map(table_row).collect());
    println!(
        "Page {} of {} ({} Flash {})",
        args.page,
        pagination.page_count(total),
        total,
        if total == 1 { "activity" } else { "activities" }
    );
    Ok(())
}
