//! Flash Apocalypse audit
//!
//! Finds legacy Flash content (`.fla`, `.flv`, `.swf`) in a learning
//! platform's file store and keeps a snapshot of what was found.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ ModuleRegistry │────▶│   Scanner    │────▶│ SnapshotStore  │
//! │ FileInventory  │     │ (per module, │     │ (one txn:      │
//! │                │     │ dedup, html5)│     │ swap + run row)│
//! └────────────────┘     └──────────────┘     └────────────────┘
//! ```
//!
//! The read path (report, export, status) reads only the persisted snapshot.

pub mod audit;
pub mod category;
pub mod config;
pub mod error;
pub mod inventory;
pub mod patterns;
pub mod persistence;
pub mod report;
pub mod scanner;
pub mod schedule;
pub mod snapshot;
pub mod sqlite;
pub mod types;
pub mod urls;

// Re-exports for convenience
pub use audit::{AuditRunner, FlashAudit};
pub use config::AuditConfig;
pub use error::{AuditError, Result};
pub use inventory::{CategoryDirectory, FileInventory, ModuleRegistry};
pub use persistence::AuditPersistence;
pub use scanner::Scanner;
pub use schedule::{IntervalScheduler, ScheduledAudit, ScheduledTask, SchedulerReport};
pub use snapshot::SnapshotStore;
pub use sqlite::{SqliteAuditStore, SqliteHost};
pub use types::{
    ActivityKind, AuditRecord, AuditRun, CandidateHit, ModuleDescriptor, PendingRecord,
    RunSummary, SortColumn, SortDirection, SortOrder,
};
pub use urls::SiteUrls;
