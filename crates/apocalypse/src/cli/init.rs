//! Init command - write a default config and create the audit tables

use super::config::{apocalypse_home, default_config_path, ensure_apocalypse_home};
use super::context::GlobalArgs;
use anyhow::{Context, Result};
use apocalypse_audit::{AuditConfig, SqliteAuditStore};
use apocalypse_db::DbConnection;
use tracing::info;

#[derive(Debug, clap::Args)]
pub struct InitArgs {
    /// Site root used for course and activity links
    #[arg(long)]
    pub site_url: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn run(global: &GlobalArgs, args: InitArgs) -> Result<()> {
    ensure_apocalypse_home().context("Failed to create home directory")?;
    let config_path = global.config.clone().unwrap_or_else(default_config_path);

    let config = if config_path.exists() && !args.force {
        let mut config = AuditConfig::load(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;
        if let Some(site_url) = args.site_url {
            config.site_url = site_url;
            config.validate()?;
            config.save(&config_path)?;
            println!("Updated site_url in {}", config_path.display());
        } else {
            println!("Config already exists: {}", config_path.display());
        }
        config
    } else {
        let mut config = AuditConfig::default();
        if let Some(site_url) = args.site_url {
            config.site_url = site_url;
        }
        config.validate()?;
        config
            .save(&config_path)
            .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        println!("Wrote config: {}", config_path.display());
        config
    };

    let db_path = global
        .database
        .clone()
        .unwrap_or_else(|| config.database_path_in(&apocalypse_home()));
    let conn = DbConnection::open(&db_path)
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
    SqliteAuditStore::open(conn, &config.table_prefix).context("Failed to create audit tables")?;

    info!(db = %db_path.display(), prefix = %config.table_prefix, "Audit tables ready");
    println!("Audit tables ready in {}", db_path.display());
    Ok(())
}
