//! Configuration paths for the audit tool
//!
//! All paths are under ~/.flash_apocalypse/ unless overridden.

use std::path::PathBuf;

pub use apocalypse_logging::apocalypse_home;

/// Default config file: `<home>/config.toml`
pub fn default_config_path() -> PathBuf {
    apocalypse_home().join("config.toml")
}

/// Ensure the home directory exists
pub fn ensure_apocalypse_home() -> std::io::Result<PathBuf> {
    let home = apocalypse_home();
    std::fs::create_dir_all(&home)?;
    Ok(home)
}
