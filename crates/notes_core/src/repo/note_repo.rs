//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide save/find/delete APIs over the `notes` table.
//!
//! # Invariants
//! - `save` is an upsert keyed by id; `created_at`/`created_by` are never
//!   overwritten once stored.
//! - `delete` is a hard delete.
//! - Rows that fail `Note::validate()` are rejected on read.

use crate::model::note::{Note, NoteId};
use crate::repo::{ensure_table_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    content,
    tags,
    created_at,
    updated_at,
    created_by,
    updated_by
FROM notes";

/// Repository interface for the note store.
pub trait NoteRepository {
    /// Inserts or updates by id and returns the stored state.
    fn save(&self, note: &Note) -> RepoResult<Note>;
    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Returns every note ordered by `created_at ASC, id ASC`.
    fn find_all(&self) -> RepoResult<Vec<Note>>;
    fn delete(&self, note: &Note) -> RepoResult<()>;
}

/// SQLite-backed note store.
///
/// Accepts any `&Connection`, including one obtained by dereferencing a
/// `rusqlite::Transaction`.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Constructs a repository after checking that the schema is present.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_exists(conn, "notes")?;
        Ok(Self::new(conn))
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn save(&self, note: &Note) -> RepoResult<Note> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (
                id,
                title,
                content,
                tags,
                created_at,
                updated_at,
                created_by,
                updated_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                tags = excluded.tags,
                updated_at = excluded.updated_at,
                updated_by = excluded.updated_by;",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_deref(),
                note.tags.as_deref(),
                note.created_at,
                note.updated_at,
                note.created_by.as_str(),
                note.updated_by.as_str(),
            ],
        )?;

        self.find_by_id(note.id)?
            .ok_or_else(|| RepoError::InvalidData(format!("note {} missing after save", note.id)))
    }

    fn find_by_id(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn find_all(&self) -> RepoResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete(&self, note: &Note) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [note.id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(note.id));
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{id_text}` in notes.id")))?;

    let note = Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        tags: row.get("tags")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    };
    note.validate()
        .map_err(|err| RepoError::InvalidData(format!("note {id}: {err}")))?;
    Ok(note)
}

#[cfg(test)]
mod tests {
    use super::{NoteRepository, SqliteNoteRepository};
    use crate::db::open_db_in_memory;
    use crate::model::note::Note;
    use crate::repo::RepoError;

    #[test]
    fn save_upsert_keeps_creation_metadata() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();

        let mut note = Note::new("draft", None, None, "alice", 1_000);
        repo.save(&note).unwrap();

        note.title = "final".to_string();
        note.created_by = "mallory".to_string();
        note.touch("bob", 2_000);
        let stored = repo.save(&note).unwrap();

        assert_eq!(stored.title, "final");
        assert_eq!(stored.created_by, "alice");
        assert_eq!(stored.created_at, 1_000);
        assert_eq!(stored.updated_by, "bob");
        assert_eq!(stored.updated_at, 2_000);
    }

    #[test]
    fn save_rejects_invalid_note_before_sql() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();

        let note = Note::new("  ", None, None, "alice", 1_000);
        let err = repo.save(&note).unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repo.find_all().unwrap().is_empty());
    }

    #[test]
    fn find_all_orders_by_creation_time() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();

        let later = Note::new("later", None, None, "alice", 2_000);
        let earlier = Note::new("earlier", None, None, "alice", 1_000);
        repo.save(&later).unwrap();
        repo.save(&earlier).unwrap();

        let titles: Vec<String> = repo
            .find_all()
            .unwrap()
            .into_iter()
            .map(|note| note.title)
            .collect();
        assert_eq!(titles, vec!["earlier".to_string(), "later".to_string()]);
    }

    #[test]
    fn delete_missing_note_returns_not_found() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteNoteRepository::try_new(&conn).unwrap();

        let note = Note::new("ghost", None, None, "alice", 1_000);
        let err = repo.delete(&note).unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == note.id));
    }

    #[test]
    fn read_rejects_corrupted_rows() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO notes (id, title, created_at, updated_at, created_by, updated_by)
             VALUES ('not-a-uuid', 't', 1, 1, 'a', 'a');",
            [],
        )
        .unwrap();

        let repo = SqliteNoteRepository::try_new(&conn).unwrap();
        let err = repo.find_all().unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
