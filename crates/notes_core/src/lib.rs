//! Core domain logic for the audited notes service.
//! This crate is the single source of truth for note invariants and the
//! audit-trail recording discipline.

pub mod api;
pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use api::{ApiError, ApiResult, NoteResponse, NotesApi};
pub use context::{RequestContext, SYSTEM_ACTOR, USER_ID_HEADER};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::audit::{AuditAction, AuditEntry, AuditEntryId, AuditTarget};
pub use model::note::{Note, NoteId, NotePatchRequest, NoteRequest, NoteValidationError};
pub use repo::audit_repo::{AuditRepository, SqliteAuditRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{RepoError, RepoResult};
pub use service::audit_service::{AuditService, SERIALIZATION_FAILED};
pub use service::note_service::{ErrorKind, NoteService, NoteServiceError, NoteServiceResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Liveness probe text.
pub fn health() -> &'static str {
    "OK"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
