//! Process-level audit run locking.
//!
//! Two audit runs against the same store must not interleave their
//! snapshot replacements. The lock is an advisory file next to the
//! database, held for the duration of one run.
//!
//! Uses the `fs2` crate for cross-platform file locking (MSRV 1.75 compatible).

use chrono::Utc;
use fs2::FileExt;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from lock operations.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("An audit run is already in progress for {0}")]
    Locked(PathBuf),

    #[error("Failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),

    #[error("Failed to acquire lock: {0}")]
    AcquireFailed(#[source] io::Error),
}

/// Holds an exclusive run lock. Released on drop.
pub struct RunLockGuard {
    _file: File,
    lock_path: PathBuf,
    sidecar_path: Option<PathBuf>,
}

impl RunLockGuard {
    /// Get the path to the lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

#[derive(Serialize)]
struct LockSidecar<'a> {
    pid: u32,
    timestamp: String,
    purpose: &'a str,
}

fn sidecar_path_for(lock_path: &Path) -> PathBuf {
    let ext = lock_path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("lock");
    lock_path.with_extension(format!("{ext}.json"))
}

fn write_lock_sidecar(lock_path: &Path, purpose: &str) -> Option<PathBuf> {
    let sidecar = LockSidecar {
        pid: std::process::id(),
        timestamp: Utc::now().to_rfc3339(),
        purpose,
    };
    let sidecar_path = sidecar_path_for(lock_path);
    match serde_json::to_vec_pretty(&sidecar)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
        .and_then(|payload| fs::write(&sidecar_path, payload))
    {
        Ok(()) => Some(sidecar_path),
        Err(e) => {
            warn!(
                "Failed to write lock sidecar {}: {}",
                sidecar_path.display(),
                e
            );
            None
        }
    }
}

impl Drop for RunLockGuard {
    fn drop(&mut self) {
        debug!("Releasing run lock: {}", self.lock_path.display());
        if let Some(path) = &self.sidecar_path {
            if let Err(e) = fs::remove_file(path) {
                debug!("Failed to remove lock sidecar {}: {}", path.display(), e);
            }
        }
    }
}

impl std::fmt::Debug for RunLockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLockGuard")
            .field("lock_path", &self.lock_path)
            .finish()
    }
}

/// Get the lock file path for a database path.
///
/// - `/data/audit.sqlite3` → `/data/audit.sqlite3.lock`
/// - `/data/audit` → `/data/audit.lock`
pub fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut lock_path = db_path.to_path_buf();
    match lock_path.extension() {
        Some(ext) => {
            let new_ext = format!("{}.lock", ext.to_string_lossy());
            lock_path.set_extension(new_ext);
        }
        None => {
            lock_path.set_extension("lock");
        }
    }
    lock_path
}

/// Try to acquire the run lock for a database without blocking.
///
/// Returns `Err(LockError::Locked)` immediately if another process holds it.
pub fn try_lock_exclusive(db_path: &Path, purpose: &str) -> Result<RunLockGuard, LockError> {
    let lock_path = lock_path_for(db_path);
    if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(LockError::CreateFailed)?;
    }

    debug!("Attempting to acquire run lock: {}", lock_path.display());

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(LockError::CreateFailed)?;

    // Fully qualified: std::fs::File::try_lock_exclusive (1.89+) has a different error type.
    match FileExt::try_lock_exclusive(&file) {
        Ok(()) => {
            info!("Acquired run lock: {}", lock_path.display());
            let sidecar_path = write_lock_sidecar(&lock_path, purpose);
            Ok(RunLockGuard {
                _file: file,
                lock_path,
                sidecar_path,
            })
        }
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
            debug!("Run lock is held by another process");
            Err(LockError::Locked(db_path.to_path_buf()))
        }
        Err(e) => Err(LockError::AcquireFailed(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_for() {
        assert_eq!(
            lock_path_for(Path::new("/data/audit.sqlite3")),
            PathBuf::from("/data/audit.sqlite3.lock")
        );
        assert_eq!(
            lock_path_for(Path::new("/data/audit")),
            PathBuf::from("/data/audit.lock")
        );
    }

    #[test]
    fn test_second_lock_is_rejected_until_release() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("audit.sqlite3");

        let guard = try_lock_exclusive(&db_path, "test").unwrap();
        assert!(guard.lock_path().exists());

        let second = try_lock_exclusive(&db_path, "test");
        assert!(matches!(second, Err(LockError::Locked(_))));

        drop(guard);
        assert!(try_lock_exclusive(&db_path, "test").is_ok());
    }

    #[test]
    fn test_sidecar_written_and_removed() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("audit.sqlite3");
        let sidecar = sidecar_path_for(&lock_path_for(&db_path));

        let guard = try_lock_exclusive(&db_path, "audit run").unwrap();
        let payload: serde_json::Value =
            serde_json::from_slice(&fs::read(&sidecar).unwrap()).unwrap();
        assert_eq!(payload["pid"], std::process::id());
        assert_eq!(payload["purpose"], "audit run");

        drop(guard);
        assert!(!sidecar.exists());
    }
}
