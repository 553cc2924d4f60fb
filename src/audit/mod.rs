//! Audit logging for budget sessions
//!
//! Records every committed ledger change with before/after values in an
//! append-only audit log.
//!
//! # Architecture
//!
//! - `AuditEntry`: a single entry with timestamp, operation, entity
//!   information, optional before/after values, and the `CategoryChange`
//!   list of share and estimate movements it caused.
//! - `AuditLogger`: writes entries to the audit log file as line-delimited
//!   JSON (JSONL).
//! - `ledger_changes` / `category_diff` / `ledger_diff`: what an operation
//!   changed, structured and as human-readable summaries.
//!
//! # Example
//!
//! ```rust,ignore
//! use wedding_budget::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(audit_log_path);
//! let entry = AuditEntry::category_removed(&removed, &before, &after);
//! assert!(entry.net_share_delta().is_zero());
//! logger.log(&entry)?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::{category_diff, ledger_changes, ledger_diff};
pub use entry::{AuditEntry, CategoryChange, EntityType, Operation};
pub use logger::AuditLogger;
