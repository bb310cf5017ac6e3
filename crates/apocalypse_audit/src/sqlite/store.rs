use super::schema::{ensure_audit_schema, RECORDS_TABLE, RUNS_TABLE};
use super::table;
use crate::error::Result;
use crate::persistence::AuditPersistence;
use crate::types::{AuditRecord, AuditRun, PendingRecord, RunSummary, SortOrder};
use apocalypse_db::{DbConnection, DbRow, DbValue};
use tracing::{debug, info};

const RECORD_COLUMNS: &[&str] = &[
    "category",
    "coursefullname",
    "courseurl",
    "type",
    "activityname",
    "activityurl",
    "html5present",
];

/// Audit snapshot and run history in `<prefix>report_apocalypse*` tables.
#[derive(Debug, Clone)]
pub struct SqliteAuditStore {
    conn: DbConnection,
    /// Unquoted, for bulk inserts (which quote themselves).
    records_name: String,
    records: String,
    runs: String,
}

impl SqliteAuditStore {
    /// Wrap `conn`, creating the audit tables if needed.
    pub fn open(conn: DbConnection, prefix: &str) -> Result<Self> {
        ensure_audit_schema(&conn, prefix)?;
        Ok(Self {
            conn,
            records_name: format!("{prefix}{RECORDS_TABLE}"),
            records: table(prefix, RECORDS_TABLE)?,
            runs: table(prefix, RUNS_TABLE)?,
        })
    }

    pub fn connection(&self) -> &DbConnection {
        &self.conn
    }

    fn record_from_row(row: &DbRow) -> Result<AuditRecord> {
        Ok(AuditRecord {
            id: row.get_by_name("id")?,
            category: row.get_by_name("category")?,
            course_full_name: row.get_by_name("coursefullname")?,
            course_url: row.get_by_name("courseurl")?,
            activity_type: row.get_by_name::<String>("type")?.as_str().into(),
            activity_name: row.get_by_name("activityname")?,
            activity_url: row.get_by_name("activityurl")?,
            html5_present: row.get_by_name("html5present")?,
        })
    }

    fn run_from_row(row: &DbRow) -> Result<AuditRun> {
        Ok(AuditRun {
            id: row.get_by_name("id")?,
            run_at: row.get_by_name("rundatetime")?,
            flash_activity_count: row.get_by_name("countflashactivities")?,
        })
    }
}

/// SQLite reads `LIMIT -1` as unbounded.
fn sql_limit(limit: u64) -> i64 {
    if limit == 0 {
        -1
    } else {
        i64::try_from(limit).unwrap_or(i64::MAX)
    }
}

fn sql_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl AuditPersistence for SqliteAuditStore {
    fn replace_snapshot(&self, records: &[PendingRecord], run_at: i64) -> Result<RunSummary> {
        let rows: Vec<Vec<DbValue>> = records
            .iter()
            .map(|record| {
                vec![
                    DbValue::from(record.category.as_str()),
                    DbValue::from(record.course_full_name.as_str()),
                    DbValue::from(record.course_url.as_str()),
                    DbValue::from(record.activity_type.as_str()),
                    DbValue::from(record.activity_name.as_str()),
                    DbValue::from(record.activity_url.as_str()),
                    DbValue::from(record.html5_present),
                ]
            })
            .collect();

        let count = self.conn.transaction(|tx| -> Result<u64> {
            let removed = tx.execute(&format!("DELETE FROM {}", self.records), &[])?;
            let inserted = tx.bulk_insert_rows(&self.records_name, RECORD_COLUMNS, &rows)?;
            tx.execute(
                &format!(
                    "INSERT INTO {} (rundatetime, countflashactivities) VALUES (?, ?)",
                    self.runs
                ),
                &[DbValue::from(run_at), DbValue::from(sql_count(inserted))],
            )?;
            debug!(removed, inserted, "Replaced audit snapshot");
            Ok(inserted)
        })?;

        Ok(RunSummary { count, run_at })
    }

    fn list_page(&self, offset: u64, limit: u64, sort: SortOrder) -> Result<Vec<AuditRecord>> {
        let sql = format!(
            "SELECT id, category, coursefullname, courseurl, type, activityname, activityurl, html5present \
             FROM {} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
            self.records,
            sort.column.column_name(),
            sort.direction.keyword(),
        );
        self.conn
            .query_all(
                &sql,
                &[DbValue::from(sql_limit(limit)), DbValue::from(sql_count(offset))],
            )?
            .iter()
            .map(Self::record_from_row)
            .collect()
    }

    fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.records);
        Ok(self.conn.query_scalar::<u64>(&sql, &[])?)
    }

    fn last_run(&self) -> Result<Option<AuditRun>> {
        let sql = format!(
            "SELECT id, rundatetime, countflashactivities FROM {} \
             ORDER BY rundatetime DESC, id DESC LIMIT 1",
            self.runs
        );
        self.conn
            .query_optional(&sql, &[])?
            .as_ref()
            .map(Self::run_from_row)
            .transpose()
    }

    fn list_runs(&self, limit: u64) -> Result<Vec<AuditRun>> {
        let sql = format!(
            "SELECT id, rundatetime, countflashactivities FROM {} \
             ORDER BY rundatetime DESC, id DESC LIMIT ?",
            self.runs
        );
        self.conn
            .query_all(&sql, &[DbValue::from(sql_limit(limit))])?
            .iter()
            .map(Self::run_from_row)
            .collect()
    }

    fn prune_runs(&self, keep_last: u64) -> Result<u64> {
        let sql = format!(
            "DELETE FROM {runs} WHERE id NOT IN ( \
                 SELECT id FROM {runs} ORDER BY rundatetime DESC, id DESC LIMIT ? \
             )",
            runs = self.runs
        );
        let removed = self.conn.execute(&sql, &[DbValue::from(sql_count(keep_last))])?;
        if removed > 0 {
            info!(removed, keep_last, "Pruned audit run history");
        }
        Ok(removed)
    }
}
