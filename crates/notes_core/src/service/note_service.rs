//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/list/get/update/patch/delete for notes.
//! - Record one audit entry per successful operation, reads included.
//!
//! # Invariants
//! - Each operation is one `IMMEDIATE` transaction holding the note mutation
//!   and its audit append; on any error the transaction is rolled back.
//! - Validation and not-found failures happen before any write, so they
//!   leave no note change and no audit entry.
//! - The combined-length rule is checked against the values the note would
//!   have after the operation.
//! - The actor comes only from the `RequestContext` argument.

use crate::context::RequestContext;
use crate::model::audit::{AuditAction, AuditTarget};
use crate::model::now_epoch_ms;
use crate::model::note::{
    validate_combined_length, Note, NoteId, NotePatchRequest, NoteRequest, NoteValidationError,
};
use crate::repo::audit_repo::SqliteAuditRepository;
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::RepoError;
use crate::service::audit_service::AuditService;
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Caller-facing failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    ValidationError,
    InternalError,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Request or business-rule violation.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl NoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(_) => ErrorKind::InternalError,
        }
    }

    /// Stable `Type::Variant` label of the failure that caused this error.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "NoteServiceError::Validation",
            Self::NotFound(_) => "NoteServiceError::NotFound",
            Self::Repo(err) => err.kind_name(),
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for NoteServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

type NoteStore<'tx> = SqliteNoteRepository<'tx>;
type AuditStore<'tx> = AuditService<SqliteAuditRepository<'tx>>;

/// Note service bound to one SQLite connection.
pub struct NoteService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> NoteService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Creates one note attributed to the context actor.
    pub fn create(&mut self, ctx: &RequestContext, request: &NoteRequest) -> NoteServiceResult<Note> {
        request.validate()?;
        validate_combined_length(&request.title, request.content.as_deref())?;

        let note = Note::new(
            request.title.as_str(),
            request.content.clone(),
            request.tags.clone(),
            ctx.actor(),
            now_epoch_ms(),
        );

        self.unit_of_work("note_create", |notes, audit| {
            let saved = notes.save(&note)?;
            audit.record(
                ctx.actor(),
                AuditAction::Create,
                AuditTarget::note(saved.id),
                None::<&Note>,
                Some(&saved),
                "create note",
            )?;
            Ok(saved)
        })
    }

    /// Lists every note. One `READ` entry records only the count.
    pub fn list(&mut self, ctx: &RequestContext) -> NoteServiceResult<Vec<Note>> {
        self.unit_of_work("note_list", |notes, audit| {
            let items = notes.find_all()?;
            let summary = serde_json::json!({ "count": items.len() });
            audit.record(
                ctx.actor(),
                AuditAction::Read,
                AuditTarget::note_collection(),
                None::<&Note>,
                Some(&summary),
                "list notes",
            )?;
            Ok(items)
        })
    }

    pub fn get(&mut self, ctx: &RequestContext, id: NoteId) -> NoteServiceResult<Note> {
        self.unit_of_work("note_get", |notes, audit| {
            let note = find_existing(notes, id)?;
            audit.record(
                ctx.actor(),
                AuditAction::Read,
                AuditTarget::note(id),
                None::<&Note>,
                Some(&note),
                "get note",
            )?;
            Ok(note)
        })
    }

    /// Replaces title, content and tags.
    pub fn update(
        &mut self,
        ctx: &RequestContext,
        id: NoteId,
        request: &NoteRequest,
    ) -> NoteServiceResult<Note> {
        self.unit_of_work("note_update", |notes, audit| {
            let mut note = find_existing(notes, id)?;
            let before = note.snapshot();

            request.validate()?;
            validate_combined_length(&request.title, request.content.as_deref())?;

            note.title = request.title.clone();
            note.content = request.content.clone();
            note.tags = request.tags.clone();
            note.touch(ctx.actor(), now_epoch_ms());

            let saved = notes.save(&note)?;
            audit.record(
                ctx.actor(),
                AuditAction::Update,
                AuditTarget::note(id),
                Some(&before),
                Some(&saved),
                "full update",
            )?;
            Ok(saved)
        })
    }

    /// Applies only the fields present in `patch`.
    pub fn patch(
        &mut self,
        ctx: &RequestContext,
        id: NoteId,
        patch: &NotePatchRequest,
    ) -> NoteServiceResult<Note> {
        self.unit_of_work("note_patch", |notes, audit| {
            let mut note = find_existing(notes, id)?;
            let before = note.snapshot();

            if patch.has_blank_title() {
                return Err(NoteValidationError::BlankTitle.into());
            }
            patch.validate()?;
            let effective_title = patch.title.as_deref().unwrap_or(&note.title);
            let effective_content = patch.content.as_deref().or(note.content.as_deref());
            validate_combined_length(effective_title, effective_content)?;

            if let Some(title) = &patch.title {
                note.title = title.clone();
            }
            if let Some(content) = &patch.content {
                note.content = Some(content.clone());
            }
            if let Some(tags) = &patch.tags {
                note.tags = Some(tags.clone());
            }
            note.touch(ctx.actor(), now_epoch_ms());

            let saved = notes.save(&note)?;
            audit.record(
                ctx.actor(),
                AuditAction::Update,
                AuditTarget::note(id),
                Some(&before),
                Some(&saved),
                "partial update",
            )?;
            Ok(saved)
        })
    }

    /// Hard-deletes one note; the audit entry keeps its last state.
    pub fn delete(&mut self, ctx: &RequestContext, id: NoteId) -> NoteServiceResult<()> {
        self.unit_of_work("note_delete", |notes, audit| {
            let note = find_existing(notes, id)?;
            let before = note.snapshot();
            notes.delete(&note)?;
            audit.record(
                ctx.actor(),
                AuditAction::Delete,
                AuditTarget::note(id),
                Some(&before),
                None::<&Note>,
                "delete note",
            )?;
            Ok(())
        })
    }

    fn unit_of_work<T>(
        &mut self,
        event: &'static str,
        work: impl FnOnce(&NoteStore<'_>, &AuditStore<'_>) -> NoteServiceResult<T>,
    ) -> NoteServiceResult<T> {
        let started_at = Instant::now();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcome = {
            let notes = SqliteNoteRepository::new(&tx);
            let audit = AuditService::new(SqliteAuditRepository::new(&tx));
            work(&notes, &audit)
        };

        // Dropping `tx` without commit rolls back the note write and the audit
        // append together.
        let outcome = outcome.and_then(|value| {
            tx.commit()?;
            Ok(value)
        });

        match &outcome {
            Ok(_) => info!(
                "event={event} module=service status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) if err.kind() == ErrorKind::InternalError => error!(
                "event={event} module=service status=error error_code={} duration_ms={} error={err}",
                err.kind(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => info!(
                "event={event} module=service status=rejected error_code={} duration_ms={}",
                err.kind(),
                started_at.elapsed().as_millis()
            ),
        }
        outcome
    }
}

fn find_existing(notes: &NoteStore<'_>, id: NoteId) -> NoteServiceResult<Note> {
    notes.find_by_id(id)?.ok_or(NoteServiceError::NotFound(id))
}
