//! Note domain model and request shapes.
//!
//! # Responsibility
//! - Define the canonical note record and its lifecycle helpers.
//! - Validate create/update/patch input before any store mutation.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `updated_at >= created_at`.
//! - `updated_by` always names the most recent mutator.
//! - Lengths are counted in UTF-16 code units, so a character outside the
//!   Basic Multilingual Plane counts as two.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a note.
pub type NoteId = Uuid;

/// Maximum title length.
pub const TITLE_MAX_CHARS: usize = 200;
/// Maximum content length.
pub const CONTENT_MAX_CHARS: usize = 5000;
/// Maximum length of the free-form tag string.
pub const TAGS_MAX_CHARS: usize = 500;
/// Upper bound for `len(title) + len(content)`.
pub const MAX_COMBINED_LENGTH: usize = 5200;

/// Validation errors for note input and persisted note state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace-only.
    BlankTitle,
    /// One field exceeds its length bound.
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Title and content together exceed `MAX_COMBINED_LENGTH`.
    CombinedLengthExceeded { actual: usize },
    /// Persisted timestamps are out of order.
    TimestampOrder { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::FieldTooLong { field, max, actual } => write!(
                f,
                "{field} must be at most {max} characters, got {actual}"
            ),
            Self::CombinedLengthExceeded { actual } => write!(
                f,
                "combined title+content length exceeds {MAX_COMBINED_LENGTH} characters, got {actual}"
            ),
            Self::TimestampOrder {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Canonical note record.
///
/// Serialized with camelCase field names; this is the shape captured in
/// audit before/after snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: Option<String>,
    /// Free-form delimited tag string, e.g. `work,personal`.
    pub tags: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Never earlier than `created_at`.
    pub updated_at: i64,
    pub created_by: String,
    pub updated_by: String,
}

impl Note {
    /// Creates a new note with a generated stable ID.
    ///
    /// `actor` is stamped as both creator and updater, and both timestamps
    /// are set to `now_ms`.
    pub fn new(
        title: impl Into<String>,
        content: Option<String>,
        tags: Option<String>,
        actor: &str,
        now_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content,
            tags,
            created_at: now_ms,
            updated_at: now_ms,
            created_by: actor.to_string(),
            updated_by: actor.to_string(),
        }
    }

    /// Returns a field-by-field copy used as an audit before-state.
    pub fn snapshot(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by.clone(),
            updated_by: self.updated_by.clone(),
        }
    }

    /// Records a mutation by `actor` at `now_ms`.
    ///
    /// A clock that moved backwards is clamped to `created_at`.
    pub fn touch(&mut self, actor: &str, now_ms: i64) {
        self.updated_at = now_ms.max(self.created_at);
        self.updated_by = actor.to_string();
    }

    /// Validates invariants that must hold for every stored note.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        validate_optional_field("content", self.content.as_deref(), CONTENT_MAX_CHARS)?;
        validate_optional_field("tags", self.tags.as_deref(), TAGS_MAX_CHARS)?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::TimestampOrder {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Input for create and full-replace update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRequest {
    pub title: String,
    pub content: Option<String>,
    pub tags: Option<String>,
}

impl NoteRequest {
    /// Creates a request with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: None,
            tags: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Checks per-field bounds. The combined-length rule is separate.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        validate_optional_field("content", self.content.as_deref(), CONTENT_MAX_CHARS)?;
        validate_optional_field("tags", self.tags.as_deref(), TAGS_MAX_CHARS)
    }
}

/// Input for partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotePatchRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<String>,
}

impl NotePatchRequest {
    /// Returns whether the patch supplies a title that is present but blank.
    pub fn has_blank_title(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.trim().is_empty())
    }

    /// Checks per-field upper bounds for the supplied fields only.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_optional_field("title", self.title.as_deref(), TITLE_MAX_CHARS)?;
        validate_optional_field("content", self.content.as_deref(), CONTENT_MAX_CHARS)?;
        validate_optional_field("tags", self.tags.as_deref(), TAGS_MAX_CHARS)
    }
}

/// Enforces `len(title) + len(content) <= MAX_COMBINED_LENGTH`.
///
/// Callers pass the values the note would have after the operation.
pub fn validate_combined_length(
    title: &str,
    content: Option<&str>,
) -> Result<(), NoteValidationError> {
    let actual = text_len(title) + content.map_or(0, text_len);
    if actual > MAX_COMBINED_LENGTH {
        return Err(NoteValidationError::CombinedLengthExceeded { actual });
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::BlankTitle);
    }
    validate_optional_field("title", Some(title), TITLE_MAX_CHARS)
}

fn validate_optional_field(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), NoteValidationError> {
    let actual = value.map_or(0, text_len);
    if actual > max {
        return Err(NoteValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

fn text_len(value: &str) -> usize {
    value.encode_utf16().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_note_stamps_actor_and_equal_timestamps() {
        let note = Note::new("T", Some("C".to_string()), None, "alice", 1_000);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(note.created_by, "alice");
        assert_eq!(note.updated_by, "alice");
        assert!(note.validate().is_ok());
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let mut note = Note::new("before", None, Some("a,b".to_string()), "alice", 1_000);
        let snapshot = note.snapshot();
        note.title = "after".to_string();
        note.touch("bob", 2_000);

        assert_eq!(snapshot.title, "before");
        assert_eq!(snapshot.updated_by, "alice");
        assert_eq!(snapshot.updated_at, 1_000);
        assert_eq!(snapshot.id, note.id);
    }

    #[test]
    fn touch_never_moves_updated_at_before_created_at() {
        let mut note = Note::new("T", None, None, "alice", 5_000);
        note.touch("bob", 10);
        assert_eq!(note.updated_at, 5_000);
        assert_eq!(note.updated_by, "bob");
    }

    #[test]
    fn request_rejects_whitespace_title() {
        let err = NoteRequest::new("   ").validate().unwrap_err();
        assert_eq!(err, NoteValidationError::BlankTitle);
    }

    #[test]
    fn request_counts_utf16_units_not_bytes() {
        let title = "é".repeat(TITLE_MAX_CHARS);
        assert!(NoteRequest::new(title).validate().is_ok());

        let too_long = "é".repeat(TITLE_MAX_CHARS + 1);
        let err = NoteRequest::new(too_long).validate().unwrap_err();
        assert!(matches!(
            err,
            NoteValidationError::FieldTooLong { field: "title", .. }
        ));
    }

    #[test]
    fn astral_characters_count_as_two_units() {
        let title = "\u{1F600}".repeat(TITLE_MAX_CHARS / 2);
        assert!(NoteRequest::new(title).validate().is_ok());

        let too_long = "\u{1F600}".repeat(TITLE_MAX_CHARS / 2 + 1);
        let err = NoteRequest::new(too_long).validate().unwrap_err();
        assert_eq!(
            err,
            NoteValidationError::FieldTooLong {
                field: "title",
                max: TITLE_MAX_CHARS,
                actual: TITLE_MAX_CHARS + 2,
            }
        );

        let content = "\u{1F600}".repeat(2_500);
        assert!(validate_combined_length(&"x".repeat(200), Some(&content)).is_ok());

        let content = "\u{1F600}".repeat(2_501);
        let err = validate_combined_length(&"x".repeat(200), Some(&content)).unwrap_err();
        assert_eq!(
            err,
            NoteValidationError::CombinedLengthExceeded { actual: 5_202 }
        );
    }

    #[test]
    fn combined_length_bound_is_inclusive() {
        let title = "x".repeat(200);
        let content = "y".repeat(5000);
        assert!(validate_combined_length(&title, Some(&content)).is_ok());

        let content = "y".repeat(5001);
        let err = validate_combined_length(&title, Some(&content)).unwrap_err();
        assert_eq!(
            err,
            NoteValidationError::CombinedLengthExceeded { actual: 5201 }
        );
    }

    #[test]
    fn patch_blank_title_detection_ignores_absent_title() {
        assert!(!NotePatchRequest::default().has_blank_title());
        let patch = NotePatchRequest {
            title: Some(String::new()),
            ..NotePatchRequest::default()
        };
        assert!(patch.has_blank_title());
    }
}
