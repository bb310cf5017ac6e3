//! Embedded database layer for the Flash apocalypse audit.
//!
//! All SQL in the workspace goes through [`DbConnection`]. Identifiers that
//! cannot be bound as parameters go through [`sql_guard`] first.
//!
//! ```rust,ignore
//! use apocalypse_db::{DbConnection, DbValue};
//!
//! let conn = DbConnection::open(Path::new("audit.sqlite3"))?;
//! let n: i64 = conn.query_scalar("SELECT COUNT(*) FROM mdl_report_apocalypse", &[])?;
//! ```

pub mod backend;
pub mod lock;
pub mod sql_guard;

pub use backend::{BackendError, DbConnection, DbRow, DbTransaction, DbValue, FromDbValue};
pub use lock::{lock_path_for, try_lock_exclusive, LockError, RunLockGuard};
pub use sql_guard::{prefixed_table, quote_ident, validate_identifier, SqlGuardError};
