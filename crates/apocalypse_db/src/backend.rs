//! Database backend abstraction layer.
//!
//! SQLite-only synchronous backend.
//! - One connection per process, shared via `Rc`
//! - Explicit `BEGIN IMMEDIATE` transactions, rolled back on any error

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug_span, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from database backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Type conversion error: {0}")]
    TypeConversion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Value type for query parameters and results.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl From<i32> for DbValue {
    fn from(v: i32) -> Self {
        DbValue::Integer(v as i64)
    }
}

impl From<i64> for DbValue {
    fn from(v: i64) -> Self {
        DbValue::Integer(v)
    }
}

impl From<f64> for DbValue {
    fn from(v: f64) -> Self {
        DbValue::Real(v)
    }
}

impl From<String> for DbValue {
    fn from(v: String) -> Self {
        DbValue::Text(v)
    }
}

impl From<&str> for DbValue {
    fn from(v: &str) -> Self {
        DbValue::Text(v.to_string())
    }
}

impl From<bool> for DbValue {
    fn from(v: bool) -> Self {
        DbValue::Boolean(v)
    }
}

impl From<Vec<u8>> for DbValue {
    fn from(v: Vec<u8>) -> Self {
        DbValue::Blob(v)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DbValue::Null,
        }
    }
}

impl DbValue {
    fn to_sqlite(&self) -> Value {
        match self {
            DbValue::Null => Value::Null,
            DbValue::Integer(v) => Value::Integer(*v),
            DbValue::Real(v) => Value::Real(*v),
            DbValue::Text(v) => Value::Text(v.clone()),
            DbValue::Blob(v) => Value::Blob(v.clone()),
            DbValue::Boolean(v) => Value::Integer(i64::from(*v)),
        }
    }

    fn from_sqlite(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => DbValue::Null,
            ValueRef::Integer(v) => DbValue::Integer(v),
            ValueRef::Real(v) => DbValue::Real(v),
            ValueRef::Text(v) => DbValue::Text(String::from_utf8_lossy(v).to_string()),
            ValueRef::Blob(v) => DbValue::Blob(v.to_vec()),
        }
    }
}

/// Row data from a query result.
#[derive(Debug, Clone)]
pub struct DbRow {
    columns: Vec<String>,
    values: Vec<DbValue>,
}

impl DbRow {
    /// Create a new row with column names and values.
    pub fn new(columns: Vec<String>, values: Vec<DbValue>) -> Self {
        Self { columns, values }
    }

    /// Get a value by column index.
    pub fn get<T: FromDbValue>(&self, index: usize) -> Result<T, BackendError> {
        self.values
            .get(index)
            .ok_or_else(|| {
                BackendError::TypeConversion(format!("Column index {} out of bounds", index))
            })
            .and_then(|v| T::from_db_value(v))
    }

    /// Get a value by column name.
    pub fn get_by_name<T: FromDbValue>(&self, name: &str) -> Result<T, BackendError> {
        let index =
            self.columns.iter().position(|c| c == name).ok_or_else(|| {
                BackendError::TypeConversion(format!("Column '{}' not found", name))
            })?;
        self.get(index)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }
}

/// Conversion from a raw database value into a Rust type.
pub trait FromDbValue: Sized {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError>;
}

impl FromDbValue for i64 {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Integer(v) => Ok(*v),
            DbValue::Boolean(v) => Ok(i64::from(*v)),
            _ => Err(BackendError::TypeConversion(format!(
                "Expected integer, got {:?}",
                value
            ))),
        }
    }
}

impl FromDbValue for i32 {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        let v = i64::from_db_value(value)?;
        i32::try_from(v)
            .map_err(|_| BackendError::TypeConversion(format!("Integer {} out of range for i32", v)))
    }
}

impl FromDbValue for u64 {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        let v = i64::from_db_value(value)?;
        u64::try_from(v)
            .map_err(|_| BackendError::TypeConversion(format!("Integer {} is negative", v)))
    }
}

impl FromDbValue for String {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Text(v) => Ok(v.clone()),
            DbValue::Integer(v) => Ok(v.to_string()),
            DbValue::Real(v) => Ok(v.to_string()),
            _ => Err(BackendError::TypeConversion(format!(
                "Expected text, got {:?}",
                value
            ))),
        }
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Boolean(v) => Ok(*v),
            DbValue::Integer(v) => Ok(*v != 0),
            _ => Err(BackendError::TypeConversion(format!(
                "Expected boolean, got {:?}",
                value
            ))),
        }
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Result<Self, BackendError> {
        match value {
            DbValue::Null => Ok(None),
            other => T::from_db_value(other).map(Some),
        }
    }
}

/// Unified database connection.
#[derive(Clone)]
pub struct DbConnection {
    conn: Rc<Connection>,
}

impl std::fmt::Debug for DbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbConnection")
            .field("backend", &"SQLite")
            .finish()
    }
}

impl DbConnection {
    /// Open or create a SQLite database, creating the parent directory if needed.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::configure(&conn)?;
        info!("Opened SQLite database: {}", path.display());

        Ok(Self {
            conn: Rc::new(conn),
        })
    }

    /// Open an existing database (fails if not exists).
    pub fn open_existing(path: &Path) -> Result<Self, BackendError> {
        if !path.exists() {
            return Err(BackendError::NotFound(path.display().to_string()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Self::configure(&conn)?;
        info!("Opened existing SQLite database: {}", path.display());

        Ok(Self {
            conn: Rc::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;

        Ok(Self {
            conn: Rc::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<(), BackendError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(())
    }

    /// Execute a SQL statement (no results).
    pub fn execute(&self, sql: &str, params: &[DbValue]) -> Result<u64, BackendError> {
        execute_on_conn(&self.conn, sql, params)
    }

    /// Execute a batch of SQL statements.
    pub fn execute_batch(&self, sql: &str) -> Result<(), BackendError> {
        execute_batch_on_conn(&self.conn, sql)
    }

    /// Bulk insert rows into a table.
    ///
    /// Column order must match the row value order.
    pub fn bulk_insert_rows(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<DbValue>],
    ) -> Result<u64, BackendError> {
        bulk_insert_rows_internal(&self.conn, table, columns, rows)
    }

    /// Query and return all rows.
    pub fn query_all(&self, sql: &str, params: &[DbValue]) -> Result<Vec<DbRow>, BackendError> {
        query_on_conn(&self.conn, sql, params)
    }

    /// Query and return the first row, if any.
    pub fn query_optional(
        &self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<Option<DbRow>, BackendError> {
        let rows = self.query_all(sql, params)?;
        Ok(rows.into_iter().next())
    }

    /// Query and return exactly one row.
    pub fn query_one(&self, sql: &str, params: &[DbValue]) -> Result<DbRow, BackendError> {
        self.query_optional(sql, params)?
            .ok_or_else(|| BackendError::Query("Expected one row, got none".to_string()))
    }

    /// Query and return a single scalar value.
    pub fn query_scalar<T: FromDbValue>(
        &self,
        sql: &str,
        params: &[DbValue],
    ) -> Result<T, BackendError> {
        let row = self.query_one(sql, params)?;
        row.get(0)
    }

    /// Run `op` inside a single transaction.
    ///
    /// Commits when `op` returns `Ok`; otherwise rolls back and returns the
    /// original error. A failed `COMMIT` is rolled back too, so the connection
    /// never stays inside an open transaction. Nothing written inside a failed
    /// transaction is visible afterwards.
    pub fn transaction<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut DbTransaction<'_>) -> Result<T, E>,
        E: From<BackendError> + std::fmt::Display,
    {
        self.conn
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(BackendError::from)?;
        let mut tx = DbTransaction { conn: &self.conn };
        let result = op(&mut tx);

        match result {
            Ok(value) => match self.conn.execute_batch("COMMIT") {
                Ok(()) => Ok(value),
                Err(commit_err) => {
                    Err(self.rollback_after(BackendError::from(commit_err)).into())
                }
            },
            Err(err) => match self.conn.execute_batch("ROLLBACK") {
                Ok(()) => Err(err),
                Err(rollback_err) => Err(BackendError::Transaction(format!(
                    "Transaction failed: {}; rollback failed: {}",
                    err, rollback_err
                ))
                .into()),
            },
        }
    }

    /// Roll back after `err` ended a transaction, keeping `err` as the cause.
    fn rollback_after(&self, err: BackendError) -> BackendError {
        if self.conn.is_autocommit() {
            return err;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => err,
            Err(rollback_err) => BackendError::Transaction(format!(
                "Commit failed: {}; rollback failed: {}",
                err, rollback_err
            )),
        }
    }
}

/// Transaction handle passed to [`DbConnection::transaction`].
pub struct DbTransaction<'a> {
    conn: &'a Connection,
}

impl<'a> DbTransaction<'a> {
    pub fn execute(&mut self, sql: &str, params: &[DbValue]) -> Result<u64, BackendError> {
        execute_on_conn(self.conn, sql, params)
    }

    /// Bulk insert rows into a table within this transaction.
    pub fn bulk_insert_rows(
        &mut self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<DbValue>],
    ) -> Result<u64, BackendError> {
        bulk_insert_rows_internal(self.conn, table, columns, rows)
    }
}

fn execute_on_conn(conn: &Connection, sql: &str, params: &[DbValue]) -> Result<u64, BackendError> {
    let span = debug_span!(
        "db.exec",
        op = sql_op_name(sql),
        sql_hash = %hash_sql(sql),
        duration_ms = tracing::field::Empty
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.execute(params_from_iter(params.iter().map(DbValue::to_sqlite)))?;
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    Ok(rows as u64)
}

fn execute_batch_on_conn(conn: &Connection, sql: &str) -> Result<(), BackendError> {
    let span = debug_span!(
        "db.exec_batch",
        op = "BATCH",
        sql_hash = %hash_sql(sql),
        duration_ms = tracing::field::Empty
    );
    let _guard = span.enter();
    let start = Instant::now();
    conn.execute_batch(sql)?;
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    Ok(())
}

fn query_on_conn(
    conn: &Connection,
    sql: &str,
    params: &[DbValue],
) -> Result<Vec<DbRow>, BackendError> {
    let span = debug_span!(
        "db.query",
        op = sql_op_name(sql),
        sql_hash = %hash_sql(sql),
        rows = tracing::field::Empty,
        duration_ms = tracing::field::Empty
    );
    let _guard = span.enter();
    let start = Instant::now();

    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    let column_count = columns.len();

    let mut rows = stmt.query(params_from_iter(params.iter().map(DbValue::to_sqlite)))?;
    let mut result = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            values.push(DbValue::from_sqlite(row.get_ref(i)?));
        }
        result.push(DbRow::new(columns.clone(), values));
    }

    span.record("rows", result.len() as u64);
    span.record("duration_ms", start.elapsed().as_millis() as u64);
    Ok(result)
}

const DEFAULT_MAX_PARAMS: usize = 999;

fn bulk_insert_rows_internal(
    conn: &Connection,
    table: &str,
    columns: &[&str],
    rows: &[Vec<DbValue>],
) -> Result<u64, BackendError> {
    if rows.is_empty() {
        return Ok(0);
    }
    if columns.is_empty() {
        return Err(BackendError::InvalidInput(
            "bulk_insert_rows requires at least one column".to_string(),
        ));
    }
    if columns.len() > DEFAULT_MAX_PARAMS {
        return Err(BackendError::InvalidInput(format!(
            "Too many columns ({}) for max params ({})",
            columns.len(),
            DEFAULT_MAX_PARAMS
        )));
    }

    for (index, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(BackendError::InvalidInput(format!(
                "Row {} has {} values, expected {}",
                index,
                row.len(),
                columns.len()
            )));
        }
    }

    let quoted_table = crate::sql_guard::quote_ident(table);
    let quoted_cols = columns
        .iter()
        .map(|col| crate::sql_guard::quote_ident(col))
        .collect::<Vec<_>>()
        .join(", ");
    let row_clause = format!("({})", vec!["?"; columns.len()].join(", "));
    let rows_per_chunk = DEFAULT_MAX_PARAMS / columns.len();

    let mut total = 0;
    for chunk in rows.chunks(rows_per_chunk) {
        let values_clause = vec![row_clause.as_str(); chunk.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            quoted_table, quoted_cols, values_clause
        );
        let params: Vec<DbValue> = chunk.iter().flatten().cloned().collect();
        execute_on_conn(conn, &sql, &params)?;
        total += chunk.len() as u64;
    }

    Ok(total)
}

fn sql_op_name(sql: &str) -> &str {
    sql.split_whitespace().next().unwrap_or("unknown")
}

fn hash_sql(sql: &str) -> String {
    // FNV-1a 64-bit: stable, low-cardinality statement identity for spans.
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in sql.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{:016x}", hash)
}
