//! Outer use-case facade with structured errors.
//!
//! # Responsibility
//! - Map `NoteService` results to response/error shapes for transports.
//! - Act as the global failure handler for technical errors.
//!
//! # Invariants
//! - Not-found and validation failures are returned with their own message
//!   and write nothing.
//! - Technical failures are recorded as an `ERROR` audit entry in a separate
//!   write after the business transaction has rolled back, then returned as
//!   an opaque `INTERNAL_ERROR`.
//! - Recording a technical failure never fails the call a second time.

use crate::context::RequestContext;
use crate::model::audit::AuditTarget;
use crate::model::now_epoch_ms;
use crate::model::note::{Note, NoteId, NotePatchRequest, NoteRequest};
use crate::repo::audit_repo::SqliteAuditRepository;
use crate::service::audit_service::AuditService;
use crate::service::note_service::{ErrorKind, NoteService, NoteServiceError, NoteServiceResult};
use log::{error, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Collection route for notes.
pub const NOTES_PATH: &str = "/api/notes";
/// Message returned for every technical failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Note shape returned to transport callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: NoteId,
    pub title: String,
    pub content: Option<String>,
    pub tags: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub created_by: String,
    pub updated_by: String,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            tags: note.tags,
            created_at: note.created_at,
            updated_at: note.updated_at,
            created_by: note.created_by,
            updated_by: note.updated_by,
        }
    }
}

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: ErrorKind,
    pub message: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
    pub path: String,
}

impl ApiError {
    pub fn new(code: ErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: now_epoch_ms(),
            path: path.into(),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.code, self.path, self.message)
    }
}

impl Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level facade; one call is one unit of work.
pub struct NotesApi<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> NotesApi<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    pub fn create(
        &mut self,
        ctx: &RequestContext,
        request: &NoteRequest,
    ) -> ApiResult<NoteResponse> {
        self.dispatch(ctx, NOTES_PATH.to_string(), |service| {
            service.create(ctx, request)
        })
        .map(NoteResponse::from)
    }

    pub fn list(&mut self, ctx: &RequestContext) -> ApiResult<Vec<NoteResponse>> {
        let notes = self.dispatch(ctx, NOTES_PATH.to_string(), |service| service.list(ctx))?;
        Ok(notes.into_iter().map(NoteResponse::from).collect())
    }

    pub fn get(&mut self, ctx: &RequestContext, id: NoteId) -> ApiResult<NoteResponse> {
        self.dispatch(ctx, note_path(id), |service| service.get(ctx, id))
            .map(NoteResponse::from)
    }

    pub fn update(
        &mut self,
        ctx: &RequestContext,
        id: NoteId,
        request: &NoteRequest,
    ) -> ApiResult<NoteResponse> {
        self.dispatch(ctx, note_path(id), |service| {
            service.update(ctx, id, request)
        })
        .map(NoteResponse::from)
    }

    pub fn patch(
        &mut self,
        ctx: &RequestContext,
        id: NoteId,
        patch: &NotePatchRequest,
    ) -> ApiResult<NoteResponse> {
        self.dispatch(ctx, note_path(id), |service| service.patch(ctx, id, patch))
            .map(NoteResponse::from)
    }

    pub fn delete(&mut self, ctx: &RequestContext, id: NoteId) -> ApiResult<()> {
        self.dispatch(ctx, note_path(id), |service| service.delete(ctx, id))
    }

    fn dispatch<T>(
        &mut self,
        ctx: &RequestContext,
        path: String,
        op: impl FnOnce(&mut NoteService<'_>) -> NoteServiceResult<T>,
    ) -> ApiResult<T> {
        let outcome = {
            let mut service = NoteService::new(&mut *self.conn);
            op(&mut service)
        };
        outcome.map_err(|err| handle_failure(&*self.conn, ctx, path, &err))
    }
}

/// Converts a service error into an `ApiError`.
///
/// Technical failures are written to the audit trail first, outside the
/// (already rolled back) business transaction.
pub fn handle_failure(
    conn: &Connection,
    ctx: &RequestContext,
    path: String,
    err: &NoteServiceError,
) -> ApiError {
    match err.kind() {
        kind @ (ErrorKind::NotFound | ErrorKind::ValidationError) => {
            ApiError::new(kind, err.to_string(), path)
        }
        ErrorKind::InternalError => {
            record_failure(conn, ctx, &describe_failure(err));
            ApiError::new(ErrorKind::InternalError, INTERNAL_ERROR_MESSAGE, path)
        }
    }
}

/// Best-effort `ERROR` entry; a failed append is logged and absorbed.
pub fn record_failure(conn: &Connection, ctx: &RequestContext, details: &str) {
    let audit = AuditService::new(SqliteAuditRepository::new(conn));
    if let Err(err) = audit.record_error(ctx.actor(), AuditTarget::system(), details) {
        error!("event=audit_record_error module=api status=error error_code=audit_append_failed error={err}");
        return;
    }
    warn!("event=technical_failure module=api status=recorded");
}

/// Renders `"<kind>: <message>"`, followed by any cause whose message is not
/// already part of the text.
fn describe_failure(err: &NoteServiceError) -> String {
    let mut description = format!("{}: {err}", err.kind_name());
    let mut source = err.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !description.contains(&message) {
            description.push_str(": caused by: ");
            description.push_str(&message);
        }
        source = cause.source();
    }
    description
}

fn note_path(id: NoteId) -> String {
    format!("{NOTES_PATH}/{id}")
}
