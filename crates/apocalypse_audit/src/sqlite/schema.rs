//! Audit table DDL.

use super::table;
use crate::error::Result;
use apocalypse_db::DbConnection;
use tracing::debug;

pub const RECORDS_TABLE: &str = "report_apocalypse";
pub const RUNS_TABLE: &str = "report_apocalypse_audits";

/// Create the audit tables if they do not exist.
pub fn ensure_audit_schema(conn: &DbConnection, prefix: &str) -> Result<()> {
    let records = table(prefix, RECORDS_TABLE)?;
    let runs = table(prefix, RUNS_TABLE)?;
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {records} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            category TEXT NOT NULL DEFAULT '',
            coursefullname TEXT NOT NULL,
            courseurl TEXT NOT NULL,
            type TEXT NOT NULL,
            activityname TEXT NOT NULL,
            activityurl TEXT NOT NULL,
            html5present INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS {runs} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            rundatetime INTEGER NOT NULL,
            countflashactivities INTEGER NOT NULL
        );
        "#
    ))?;
    debug!(prefix, "Audit schema ready");
    Ok(())
}
