//! Resolved CLI context: config, database path and open stores.

use super::config::{apocalypse_home, default_config_path};
use super::error::HelpfulError;
use anyhow::{Context, Result};
use apocalypse_audit::{AuditConfig, SqliteAuditStore, SqliteHost};
use apocalypse_db::{try_lock_exclusive, DbConnection, LockError, RunLockGuard};
use std::path::{Path, PathBuf};

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
}

pub struct CliContext {
    pub config: AuditConfig,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl CliContext {
    /// Load config from `--config` (must exist) or the default path (optional),
    /// then apply `--database`.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config_path = match &global.config {
            Some(path) => {
                if !path.exists() {
                    return Err(HelpfulError::config_not_found(path).into());
                }
                path.clone()
            }
            None => default_config_path(),
        };

        let config = AuditConfig::load_or_default(&config_path)
            .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

        let db_path = global
            .database
            .clone()
            .unwrap_or_else(|| config.database_path_in(&apocalypse_home()));

        Ok(Self {
            config,
            config_path,
            db_path,
        })
    }

    /// Open the existing database. Never creates one.
    pub fn open_db(&self) -> Result<DbConnection> {
        if !self.db_path.exists() {
            return Err(HelpfulError::database_not_found(&self.db_path).into());
        }
        DbConnection::open_existing(&self.db_path)
            .with_context(|| format!("Failed to open database: {}", self.db_path.display()))
    }

    pub fn open_store(&self, conn: &DbConnection) -> Result<SqliteAuditStore> {
        SqliteAuditStore::open(conn.clone(), &self.config.table_prefix)
            .context("Failed to open audit tables")
    }

    pub fn open_host(&self, conn: &DbConnection) -> Result<SqliteHost> {
        SqliteHost::new(conn.clone(), &self.config.table_prefix)
            .context("Failed to open host tables")
    }

    /// Take the run lock for this database, failing fast if it is held.
    pub fn lock(&self, purpose: &str) -> Result<RunLockGuard> {
        acquire_run_lock(&self.db_path, purpose)
    }
}

pub fn acquire_run_lock(db_path: &Path, purpose: &str) -> Result<RunLockGuard> {
    match try_lock_exclusive(db_path, purpose) {
        Ok(guard) => Ok(guard),
        Err(LockError::Locked(lock_path)) => Err(HelpfulError::run_locked(&lock_path).into()),
        Err(err) => Err(err).context("Failed to acquire run lock"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let global = GlobalArgs {
            config: Some(dir.path().join("missing.toml")),
            database: None,
        };
        let err = CliContext::load(&global).err().unwrap();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn database_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "database_path = \"/srv/lms.sqlite3\"\n").unwrap();

        let global = GlobalArgs {
            config: Some(config_path.clone()),
            database: Some(dir.path().join("other.sqlite3")),
        };
        let ctx = CliContext::load(&global).unwrap();
        assert_eq!(ctx.db_path, dir.path().join("other.sqlite3"));

        let from_config = CliContext::load(&GlobalArgs {
            config: Some(config_path),
            database: None,
        })
        .unwrap();
        assert_eq!(from_config.db_path, PathBuf::from("/srv/lms.sqlite3"));
    }

    #[test]
    fn missing_database_is_not_created() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        let ctx = CliContext::load(&GlobalArgs {
            config: Some(config_path),
            database: Some(dir.path().join("absent.sqlite3")),
        })
        .unwrap();

        assert!(ctx.open_db().is_err());
        assert!(!dir.path().join("absent.sqlite3").exists());
    }

    #[test]
    fn second_lock_reports_run_in_progress() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("lms.sqlite3");
        let _held = acquire_run_lock(&db_path, "first").unwrap();

        let err = acquire_run_lock(&db_path, "second").err().unwrap();
        assert!(err.to_string().contains("Another audit run is in progress"));
    }
}
