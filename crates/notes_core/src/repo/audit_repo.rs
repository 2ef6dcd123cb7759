//! Append-only audit store.
//!
//! # Invariants
//! - Only `append` is exposed; the schema also aborts UPDATE/DELETE on
//!   `audit_logs`.

use crate::model::audit::AuditEntry;
use crate::repo::{ensure_table_exists, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for the audit store.
pub trait AuditRepository {
    /// Appends one entry and returns it as stored.
    fn append(&self, entry: &AuditEntry) -> RepoResult<AuditEntry>;
}

/// SQLite-backed audit store.
pub struct SqliteAuditRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAuditRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_exists(conn, "audit_logs")?;
        Ok(Self::new(conn))
    }
}

impl AuditRepository for SqliteAuditRepository<'_> {
    fn append(&self, entry: &AuditEntry) -> RepoResult<AuditEntry> {
        self.conn.execute(
            "INSERT INTO audit_logs (
                id,
                actor,
                action,
                timestamp,
                entity_type,
                entity_id,
                before_state,
                after_state,
                reason,
                error_details
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                entry.id.to_string(),
                entry.actor.as_str(),
                entry.action.as_str(),
                entry.timestamp,
                entry.entity_type.as_str(),
                entry.entity_id.as_str(),
                entry.before_state.as_deref(),
                entry.after_state.as_deref(),
                entry.reason.as_deref(),
                entry.error_details.as_deref(),
            ],
        )?;
        Ok(entry.clone())
    }
}
