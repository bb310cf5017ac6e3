//! Flash apocalypse audit tool
//!
//! Scans a learning platform's file store for Flash content, keeps the most
//! recent findings as a snapshot, and reports on them:
//! - **run / schedule**: audit once, or periodically until signalled
//! - **report / export**: paginated table, CSV or JSON download
//! - **status / history**: countdown, last audit and past runs

use anyhow::Result;
use apocalypse_logging::{init_logging, LogConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::context::GlobalArgs;

#[derive(Parser, Debug)]
#[command(
    name = "apocalypse",
    version,
    about = "Audit a learning platform for Flash content"
)]
struct Cli {
    /// Config file (default: ~/.flash_apocalypse/config.toml)
    #[arg(long, global = true, env = "APOCALYPSE_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database holding host and audit tables (overrides config)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default config and create the audit tables
    Init(cli::init::InitArgs),

    /// Run one audit and replace the stored snapshot
    Run(cli::run::RunArgs),

    /// Show the countdown, last audit and a page of findings
    Report(cli::report::ReportArgs),

    /// Download the full snapshot as CSV or JSON
    Export(cli::export::ExportArgs),

    /// Show last run, record count and days remaining
    Status(cli::status::StatusArgs),

    /// List past audit runs, newest first
    History(cli::history::HistoryArgs),

    /// Delete all but the newest N audit runs
    PruneHistory(cli::history::PruneArgs),

    /// Re-run the audit on an interval until interrupted
    Schedule(cli::schedule::ScheduleArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Run(args) => args.json,
        Commands::Report(args) => args.json,
        Commands::Status(args) => args.json,
        Commands::History(args) => args.json,
        // Export without --output streams the payload on stdout.
        Commands::Export(args) => args.output.is_none(),
        _ => false,
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let global = GlobalArgs {
        config: cli.config,
        database: cli.database,
    };

    match cli.command {
        Commands::Init(args) => cli::init::run(&global, args),
        Commands::Run(args) => cli::run::run(&global, args),
        Commands::Report(args) => cli::report::run(&global, args),
        Commands::Export(args) => cli::export::run(&global, args),
        Commands::Status(args) => cli::status::run(&global, args),
        Commands::History(args) => cli::history::run(&global, args),
        Commands::PruneHistory(args) => cli::history::run_prune(&global, args),
        Commands::Schedule(args) => cli::schedule::run(&global, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let json_mode = command_wants_json(&cli.command);
    let _log_guard = match init_logging(LogConfig {
        app_name: "apocalypse",
        verbose: cli.verbose,
        quiet_console: json_mode,
    }) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "apocalypse",
            "report",
            "--database",
            "/tmp/lms.sqlite3",
            "-v",
            "--json",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/lms.sqlite3")));
        assert!(command_wants_json(&cli.command));
    }

    #[test]
    fn export_to_file_is_not_json_mode() {
        let cli =
            Cli::try_parse_from(["apocalypse", "export", "--output", "out.csv"]).unwrap();
        assert!(!command_wants_json(&cli.command));
    }

    #[test]
    fn prune_history_requires_keep() {
        assert!(Cli::try_parse_from(["apocalypse", "prune-history"]).is_err());
        assert!(Cli::try_parse_from(["apocalypse", "prune-history", "--keep", "3"]).is_ok());
    }
}
