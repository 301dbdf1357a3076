//! Note Storage
//! Mission: Persist notes keyed by owner in SQLite

use crate::notes::models::Note;
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub struct NoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl NoteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("open notes db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                username TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_notes_username ON notes(username, created_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_note(row: &Row<'_>) -> rusqlite::Result<Note> {
        Ok(Note {
            id: row.get(0)?,
            title: row.get(1)?,
            body: row.get(2)?,
            username: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }

    pub fn insert(&self, title: &str, body: &str, username: &str) -> Result<Note> {
        let now = Utc::now().to_rfc3339();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            body: body.to_string(),
            username: username.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO notes (id, title, body, username, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.id,
                note.title,
                note.body,
                note.username,
                note.created_at,
                note.updated_at,
            ],
        )
        .context("Failed to insert note")?;

        debug!("Stored note {} for {}", note.id, note.username);
        Ok(note)
    }

    pub fn get(&self, id: &str) -> Result<Option<Note>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, title, body, username, created_at, updated_at
             FROM notes WHERE id = ?1",
            params![id],
            Self::row_to_note,
        )
        .optional()
        .context("Failed to load note")
    }

    /// All notes owned by `username`, oldest first
    pub fn list_by_owner(&self, username: &str) -> Result<Vec<Note>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, title, body, username, created_at, updated_at
             FROM notes WHERE username = ?1
             ORDER BY created_at ASC, rowid ASC",
        )?;
        let notes = stmt
            .query_map(params![username], Self::row_to_note)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list notes")?;
        Ok(notes)
    }

    /// Apply the provided fields. Returns the updated note, or `None` if it no longer exists.
    pub fn update(&self, id: &str, title: Option<&str>, body: Option<&str>) -> Result<Option<Note>> {
        let changed = {
            let conn = self.conn.lock();
            conn.execute(
                "UPDATE notes
                 SET title = COALESCE(?2, title),
                     body = COALESCE(?3, body),
                     updated_at = ?4
                 WHERE id = ?1",
                params![id, title, body, Utc::now().to_rfc3339()],
            )
            .context("Failed to update note")?
        };

        if changed == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    /// Returns false when there was nothing to delete
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let removed = conn
            .execute("DELETE FROM notes WHERE id = ?1", params![id])
            .context("Failed to delete note")?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_insert_and_get() {
        let store = NoteStore::in_memory().unwrap();
        let note = store.insert("T", "B", "alice").unwrap();

        let loaded = store.get(&note.id).unwrap().unwrap();
        assert_eq!(loaded, note);
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_is_scoped_to_owner() {
        let store = NoteStore::in_memory().unwrap();
        let first = store.insert("one", "1", "alice").unwrap();
        let second = store.insert("two", "2", "alice").unwrap();
        store.insert("other", "x", "bob").unwrap();

        let notes = store.list_by_owner("alice").unwrap();
        let ids: Vec<_> = notes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert!(store.list_by_owner("carol").unwrap().is_empty());
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let store = NoteStore::in_memory().unwrap();
        let note = store.insert("T", "B", "alice").unwrap();

        let updated = store.update(&note.id, Some("T2"), None).unwrap().unwrap();
        assert_eq!(updated.title, "T2");
        assert_eq!(updated.body, "B");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.created_at, note.created_at);

        assert!(store.update("missing", Some("x"), None).unwrap().is_none());
    }

    #[test]
    fn test_delete_twice() {
        let store = NoteStore::in_memory().unwrap();
        let note = store.insert("T", "B", "alice").unwrap();

        assert!(store.delete(&note.id).unwrap());
        assert!(!store.delete(&note.id).unwrap());
        assert!(store.get(&note.id).unwrap().is_none());
    }

    #[test]
    fn test_file_backed_store_persists() {
        let temp_file = NamedTempFile::new().unwrap();
        let id = {
            let store = NoteStore::new(temp_file.path()).unwrap();
            store.insert("T", "B", "alice").unwrap().id
        };
        let store = NoteStore::new(temp_file.path()).unwrap();
        assert!(store.get(&id).unwrap().is_some());
    }
}
