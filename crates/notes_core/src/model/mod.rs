//! Domain model for notes and their audit trail.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own request-shape and business-rule validation for note input.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Note deletion is a hard delete; history survives only in audit entries.
//! - Audit entries are immutable once constructed.

pub mod audit;
pub mod note;

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}
