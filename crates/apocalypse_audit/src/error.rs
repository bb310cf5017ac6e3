//! Error types for the audit

use std::io;
use thiserror::Error;

/// Audit error type
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Database error: {0}")]
    Database(#[from] apocalypse_db::BackendError),

    #[error("Lock error: {0}")]
    Lock(#[from] apocalypse_db::LockError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid site URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid module name '{name}': {reason}")]
    InvalidModuleName { name: String, reason: String },

    #[error("Invalid table prefix '{prefix}': {reason}")]
    InvalidTablePrefix { prefix: String, reason: String },

    #[error("Invalid sort column: {0}")]
    InvalidSort(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AuditError>;
