//! Audit trail domain model.
//!
//! # Responsibility
//! - Define the immutable audit record and its action taxonomy.
//!
//! # Invariants
//! - `timestamp` is assigned when the entry is built, never by the caller.
//! - `error_details` is only set on `AuditAction::Error` entries.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

use super::now_epoch_ms;

/// Stable identifier for one audit entry.
pub type AuditEntryId = Uuid;

/// Entity type recorded for note operations.
pub const ENTITY_TYPE_NOTE: &str = "NOTE";
/// Entity type recorded for technical failures.
pub const ENTITY_TYPE_SYSTEM: &str = "SYSTEM";
/// Entity id recorded for bulk reads.
pub const ENTITY_ID_BULK: &str = "BULK";
/// Entity id recorded when no specific resource applies.
pub const ENTITY_ID_NONE: &str = "N/A";

/// Kind of operation captured by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
    /// Technical failure recorded by the global failure handler.
    Error,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Error => "ERROR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "CREATE" => Some(Self::Create),
            "READ" => Some(Self::Read),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource an audit entry is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    pub entity_type: String,
    pub entity_id: String,
}

impl AuditTarget {
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }

    /// One note, addressed by its id.
    pub fn note(id: impl Display) -> Self {
        Self::new(ENTITY_TYPE_NOTE, id.to_string())
    }

    /// The whole note collection.
    pub fn note_collection() -> Self {
        Self::new(ENTITY_TYPE_NOTE, ENTITY_ID_BULK)
    }

    /// System-level failures not tied to one resource.
    pub fn system() -> Self {
        Self::new(ENTITY_TYPE_SYSTEM, ENTITY_ID_NONE)
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub actor: String,
    pub action: AuditAction,
    /// Unix epoch milliseconds, assigned at record time.
    pub timestamp: i64,
    pub entity_type: String,
    /// String form of the resource id, or a sentinel such as `BULK`.
    pub entity_id: String,
    /// Serialized snapshot before the operation.
    pub before_state: Option<String>,
    /// Serialized snapshot after the operation.
    pub after_state: Option<String>,
    pub reason: Option<String>,
    pub error_details: Option<String>,
}

impl AuditEntry {
    /// Builds an entry for a business operation with a fresh id and timestamp.
    pub fn operation(
        actor: &str,
        action: AuditAction,
        target: AuditTarget,
        before_state: Option<String>,
        after_state: Option<String>,
        reason: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            action,
            timestamp: now_epoch_ms(),
            entity_type: target.entity_type,
            entity_id: target.entity_id,
            before_state,
            after_state,
            reason: Some(reason.to_string()),
            error_details: None,
        }
    }

    /// Builds an `ERROR` entry carrying a technical failure description.
    pub fn failure(actor: &str, target: AuditTarget, error_details: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            action: AuditAction::Error,
            timestamp: now_epoch_ms(),
            entity_type: target.entity_type,
            entity_id: target.entity_id,
            before_state: None,
            after_state: None,
            reason: None,
            error_details: Some(error_details.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditAction, AuditEntry, AuditTarget};

    #[test]
    fn action_names_round_trip_through_parse() {
        for action in [
            AuditAction::Create,
            AuditAction::Read,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Error,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("create"), None);
    }

    #[test]
    fn failure_entry_has_no_payload() {
        let entry = AuditEntry::failure("alice", AuditTarget::system(), "boom");
        assert_eq!(entry.action, AuditAction::Error);
        assert_eq!(entry.entity_type, "SYSTEM");
        assert_eq!(entry.entity_id, "N/A");
        assert!(entry.before_state.is_none());
        assert!(entry.after_state.is_none());
        assert_eq!(entry.error_details.as_deref(), Some("boom"));
    }
}
