//! Shared logging utilities for the Flash apocalypse binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "apocalypse=info,apocalypse_audit=info,apocalypse_db=warn";
const VERBOSE_LOG_FILTER: &str = "apocalypse=debug,apocalypse_audit=debug,apocalypse_db=debug";
const HOME_ENV: &str = "APOCALYPSE_HOME";
const HOME_DIR_NAME: &str = ".flash_apocalypse";

/// Logging configuration shared by the binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Keep stdout clean for machine-readable output.
    pub quiet_console: bool,
}

/// Initialize tracing with a daily rolling file writer and stderr output.
///
/// The returned guard flushes the file writer on drop; hold it for the life of
/// the process.
pub fn init_logging(config: LogConfig<'_>) -> Result<Option<WorkerGuard>> {
    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else if config.quiet_console {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let (file_layer, guard) = match ensure_logs_dir() {
        Ok(dir) => {
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", sanitize_name(config.app_name)));
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter);
            (Some(layer), Some(guard))
        }
        Err(err) => {
            eprintln!("Warning: file logging disabled: {err:#}");
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Get the tool home directory: `$APOCALYPSE_HOME` or `~/.flash_apocalypse`.
pub fn apocalypse_home() -> PathBuf {
    resolve_home(std::env::var(HOME_ENV).ok(), dirs::home_dir())
}

/// Get the logs directory: `<home>/logs`
pub fn logs_dir() -> PathBuf {
    apocalypse_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn resolve_home(override_path: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(path);
    }
    home_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(HOME_DIR_NAME)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins_over_home_dir() {
        let home = resolve_home(Some("/srv/audit".to_string()), Some(PathBuf::from("/home/a")));
        assert_eq!(home, PathBuf::from("/srv/audit"));
    }

    #[test]
    fn blank_override_is_ignored() {
        let home = resolve_home(Some("  ".to_string()), Some(PathBuf::from("/home/a")));
        assert_eq!(home, PathBuf::from("/home/a/.flash_apocalypse"));
    }

    #[test]
    fn missing_home_falls_back_to_cwd() {
        let home = resolve_home(None, None);
        assert_eq!(home, PathBuf::from("./.flash_apocalypse"));
    }

    #[test]
    fn app_names_are_sanitized_for_file_names() {
        assert_eq!(sanitize_name("apocalypse"), "apocalypse");
        assert_eq!(sanitize_name("flash audit/1"), "flash_audit_1");
    }
}
