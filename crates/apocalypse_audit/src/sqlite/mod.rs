//! SQLite-backed collaborators.
//!
//! [`SqliteHost`] reads a Moodle-shaped host schema; [`SqliteAuditStore`]
//! owns the audit tables. Both share one [`apocalypse_db::DbConnection`].

mod host;
pub mod schema;
mod store;

pub use host::SqliteHost;
pub use store::SqliteAuditStore;

use crate::error::{AuditError, Result};
use apocalypse_db::sql_guard;

/// Quoted `<prefix><name>` table reference.
pub(crate) fn table(prefix: &str, name: &str) -> Result<String> {
    sql_guard::prefixed_table(prefix, name).map_err(|err| AuditError::InvalidTablePrefix {
        prefix: prefix.to_string(),
        reason: err.to_string(),
    })
}
