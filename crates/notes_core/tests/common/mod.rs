#![allow(dead_code)]

use notes_core::{AuditAction, AuditEntry};
use rusqlite::Connection;
use uuid::Uuid;

/// Reads the whole audit trail in insertion order.
pub fn audit_entries(conn: &Connection) -> Vec<AuditEntry> {
    let mut stmt = conn
        .prepare(
            "SELECT id, actor, action, timestamp, entity_type, entity_id,
                    before_state, after_state, reason, error_details
             FROM audit_logs
             ORDER BY rowid ASC;",
        )
        .unwrap();
    let entries = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let action: String = row.get(2)?;
            Ok(AuditEntry {
                id: Uuid::parse_str(&id).unwrap(),
                actor: row.get(1)?,
                action: AuditAction::parse(&action).unwrap(),
                timestamp: row.get(3)?,
                entity_type: row.get(4)?,
                entity_id: row.get(5)?,
                before_state: row.get(6)?,
                after_state: row.get(7)?,
                reason: row.get(8)?,
                error_details: row.get(9)?,
            })
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    entries
}

pub fn audit_count(conn: &Connection) -> usize {
    audit_entries(conn).len()
}

pub fn note_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap()
}

/// Makes every audit append of `action` fail inside SQLite.
pub fn break_audit_appends(conn: &Connection, action: &str) {
    conn.execute_batch(&format!(
        "CREATE TRIGGER test_break_audit_{action}
         BEFORE INSERT ON audit_logs
         WHEN NEW.action = '{action}'
         BEGIN
             SELECT RAISE(ABORT, 'audit store unavailable');
         END;"
    ))
    .unwrap();
}
