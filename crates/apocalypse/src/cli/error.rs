//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Database file does not exist
    pub fn database_not_found(path: &Path) -> Self {
        Self::new(format!("Database not found: {}", path.display()))
            .with_context("The audit reads host tables from an existing SQLite database")
            .with_suggestions([
                format!(
                    "TRY: Point at the host database: apocalypse --database {} run",
                    path.display()
                ),
                "TRY: Set database_path in the config file".to_string(),
                "TRY: Create the audit tables first: apocalypse init".to_string(),
            ])
    }

    /// Config file given explicitly but missing
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("The --config path must point at an existing TOML file")
            .with_suggestions([
                format!(
                    "TRY: Write a default config: apocalypse --config {} init",
                    path.display()
                ),
                "TRY: Omit --config to use ~/.flash_apocalypse/config.toml".to_string(),
            ])
    }

    /// Another audit holds the run lock
    pub fn run_locked(lock_path: &Path) -> Self {
        Self::new("Another audit run is in progress")
            .with_context(format!("Lock held on {}", lock_path.display()))
            .with_suggestions([
                "TRY: Wait for the running audit to finish and retry".to_string(),
                format!(
                    "TRY: Inspect the lock owner: cat {}.json",
                    lock_path.display()
                ),
            ])
    }

    /// Unknown report sort column
    pub fn invalid_sort(column: &str) -> Self {
        Self::new(format!("Invalid sort column: '{}'", column))
            .with_context("Reports can only be sorted by a known column")
            .with_suggestion(
                "TRY: Use one of: id, category, course, type, activity, html5".to_string(),
            )
    }

    /// Unknown export format
    pub fn invalid_export_format(format: &str) -> Self {
        Self::new(format!("Invalid export format: '{}'", format))
            .with_suggestion("TRY: Use --format csv or --format json".to_string())
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}
