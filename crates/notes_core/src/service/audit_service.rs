//! Audit recording service.
//!
//! # Responsibility
//! - Serialize before/after snapshots and append audit entries.
//!
//! # Invariants
//! - A snapshot that cannot be serialized is replaced by
//!   `SERIALIZATION_FAILED`; the entry is still written.
//! - The service never opens its own transaction. Atomicity with the business
//!   mutation comes from the connection the caller hands to the store.
//! - No retries: a failed append is returned to the caller.

use crate::model::audit::{AuditAction, AuditEntry, AuditTarget};
use crate::repo::audit_repo::AuditRepository;
use crate::repo::RepoResult;
use log::warn;
use serde::Serialize;

/// Payload stored in place of a snapshot that failed to serialize.
pub const SERIALIZATION_FAILED: &str = r#"{"serialization":"failed"}"#;

/// Audit facade over an append-only store.
pub struct AuditService<S: AuditRepository> {
    store: S,
}

impl<S: AuditRepository> AuditService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends one business-operation entry.
    ///
    /// `before`/`after` are serialized to JSON when present.
    pub fn record<B, A>(
        &self,
        actor: &str,
        action: AuditAction,
        target: AuditTarget,
        before: Option<&B>,
        after: Option<&A>,
        reason: &str,
    ) -> RepoResult<AuditEntry>
    where
        B: Serialize + ?Sized,
        A: Serialize + ?Sized,
    {
        let entry = AuditEntry::operation(
            actor,
            action,
            target,
            to_json_safe(before),
            to_json_safe(after),
            reason,
        );
        self.store.append(&entry)
    }

    /// Appends an `ERROR` entry with no before/after payload.
    pub fn record_error(
        &self,
        actor: &str,
        target: AuditTarget,
        error_details: &str,
    ) -> RepoResult<AuditEntry> {
        let entry = AuditEntry::failure(actor, target, error_details);
        self.store.append(&entry)
    }
}

/// Serializes a snapshot, failing closed to `SERIALIZATION_FAILED`.
pub fn to_json_safe<T: Serialize + ?Sized>(value: Option<&T>) -> Option<String> {
    let value = value?;
    match serde_json::to_string(value) {
        Ok(json) => Some(json),
        Err(err) => {
            warn!("event=audit_snapshot module=audit status=error error_code=serialization_failed error={err}");
            Some(SERIALIZATION_FAILED.to_string())
        }
    }
}
