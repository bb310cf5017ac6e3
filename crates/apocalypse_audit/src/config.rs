//! Configuration for the audit

use crate::error::{AuditError, Result};
use crate::urls::SiteUrls;
use apocalypse_db::sql_guard::validate_prefix;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_FILE: &str = "flash_apocalypse.sqlite3";

/// Main configuration for the audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Path to the SQLite database holding host and audit tables.
    /// Unset means `<home>/flash_apocalypse.sqlite3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Root URL of the host site, used for course and activity links
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Host table prefix
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Date Flash support ends (midnight UTC)
    #[serde(default = "default_cutoff_date")]
    pub cutoff_date: NaiveDate,

    /// Report rows per page
    #[serde(default = "default_per_page")]
    pub per_page: u64,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub run_history: RunHistoryConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between scheduled audits
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunHistoryConfig {
    /// Keep only this many runs after each audit. Unset keeps all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_last: Option<u64>,
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_table_prefix() -> String {
    "mdl_".to_string()
}

fn default_cutoff_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2019, 8, 31).unwrap_or_default()
}

fn default_per_page() -> u64 {
    50
}

fn default_interval_secs() -> u64 {
    86_400
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            site_url: default_site_url(),
            table_prefix: default_table_prefix(),
            cutoff_date: default_cutoff_date(),
            per_page: default_per_page(),
            schedule: ScheduleConfig::default(),
            run_history: RunHistoryConfig::default(),
        }
    }
}

impl AuditConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AuditConfig =
            toml::from_str(&content).map_err(|e| AuditError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, else defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| AuditError::Config(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        SiteUrls::new(&self.site_url)?;
        validate_prefix(&self.table_prefix).map_err(|err| AuditError::InvalidTablePrefix {
            prefix: self.table_prefix.clone(),
            reason: err.to_string(),
        })?;
        if self.per_page == 0 {
            return Err(AuditError::Config("per_page must be at least 1".to_string()));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AuditError::Config(
                "schedule.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.run_history.keep_last == Some(0) {
            return Err(AuditError::Config(
                "run_history.keep_last must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    pub fn database_path_in(&self, home: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| home.join(DEFAULT_DATABASE_FILE))
    }

    pub fn site_urls(&self) -> Result<SiteUrls> {
        SiteUrls::new(&self.site_url)
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff_date.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}
