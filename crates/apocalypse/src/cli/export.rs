//! Export command - download the full snapshot

use super::context::{CliContext, GlobalArgs};
use super::error::HelpfulError;
use anyhow::{Context, Result};
use apocalypse_audit::report::ExportFormat;
use apocalypse_audit::{AuditPersistence, SortOrder};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Output format: csv or json
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Write to this file instead of stdout.
    /// A directory gets flash-apocalypse-report.<ext> inside it.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(global: &GlobalArgs, args: ExportArgs) -> Result<()> {
    let format: ExportFormat = args
        .format
        .parse()
        .map_err(|_| HelpfulError::invalid_export_format(&args.format))?;

    let ctx = CliContext::load(global)?;
    let conn = ctx.open_db()?;
    let store = ctx.open_store(&conn)?;
    let records = store.list_page(0, 0, SortOrder::default())?;

    match args.output {
        None => {
            let stdout = io::stdout();
            format.write(&records, stdout.lock())?;
        }
        Some(path) => {
            let path = if path.is_dir() {
                path.join(format.default_file_name())
            } else {
                path
            };
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            format.write(&records, BufWriter::new(file))?;
            info!(path = %path.display(), records = records.len(), "Export written");
            println!("Exported {} records to {}", records.len(), path.display());
        }
    }
    Ok(())
}
