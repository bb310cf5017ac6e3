//! Identifier guards for SQL that cannot be parameterized.
//!
//! Table names (prefixed tables, per-module instance tables) are spliced into
//! statements. Only names that pass [`validate_identifier`] may be spliced, and
//! they are always quoted.

use std::error::Error;
use std::fmt;

const MAX_IDENTIFIER_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlGuardError {
    message: String,
}

impl SqlGuardError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SqlGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for SqlGuardError {}

/// Validate a plugin-style identifier: `[a-z][a-z0-9_]*`, at most 64 chars.
pub fn validate_identifier(name: &str) -> Result<(), SqlGuardError> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| SqlGuardError::new("Identifier is empty"))?;
    if !first.is_ascii_lowercase() {
        return Err(SqlGuardError::new(format!(
            "Identifier '{}' must start with a lowercase letter",
            name
        )));
    }
    if let Some(bad) = chars.find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '_'))
    {
        return Err(SqlGuardError::new(format!(
            "Identifier '{}' contains invalid character '{}'",
            name, bad
        )));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(SqlGuardError::new(format!(
            "Identifier '{}' exceeds {} characters",
            name, MAX_IDENTIFIER_LEN
        )));
    }
    Ok(())
}

/// Validate a table prefix such as `mdl_`. The empty prefix is allowed.
pub fn validate_prefix(prefix: &str) -> Result<(), SqlGuardError> {
    if prefix.is_empty() {
        return Ok(());
    }
    validate_identifier(prefix)
}

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Build a quoted `<prefix><name>` table reference after validating both parts.
pub fn prefixed_table(prefix: &str, name: &str) -> Result<String, SqlGuardError> {
    validate_prefix(prefix)?;
    validate_identifier(name)?;
    Ok(quote_ident(&format!("{prefix}{name}")))
}
