//! User Storage
//! Mission: Securely store and look up user accounts with SQLite

use crate::auth::models::User;
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// User storage with SQLite backend
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    /// Open (or create) the user store at the given path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("open user db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
        let id: String = row.get(0)?;
        let id = Uuid::parse_str(&id).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;
        Ok(User {
            id,
            name: row.get(1)?,
            email: row.get(2)?,
            password_hash: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// Get user by email
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, email, password_hash, created_at
             FROM users WHERE email = ?1",
            params![email],
            Self::row_to_user,
        )
        .optional()
        .context("Failed to look up user by email")
    }

    /// Get user by display name
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name, email, password_hash, created_at
             FROM users WHERE name = ?1",
            params![name],
            Self::row_to_user,
        )
        .optional()
        .context("Failed to look up user by name")
    }

    /// Create a new user from an already-hashed password
    pub fn create_user(&self, name: &str, email: &str, password_hash: String) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Created user: {} ({})", user.name, user.id);

        Ok(user)
    }

    #[cfg(test)]
    pub(crate) fn count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

/// True when `err` came from a UNIQUE/NOT NULL constraint in SQLite
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = UserStore::new(temp_file.path()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create_user("alice", "a@x.com", "hash".to_string())
            .unwrap();
        assert_eq!(user.name, "alice");

        let by_email = store.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.password_hash, "hash");

        let by_name = store.get_user_by_name("alice").unwrap().unwrap();
        assert_eq!(by_name.email, "a@x.com");
    }

    #[test]
    fn test_missing_user_is_none() {
        let store = UserStore::in_memory().unwrap();
        assert!(store.get_user_by_email("nobody@x.com").unwrap().is_none());
        assert!(store.get_user_by_name("nobody").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_is_constraint_violation() {
        let store = UserStore::in_memory().unwrap();
        store
            .create_user("alice", "a@x.com", "hash".to_string())
            .unwrap();

        let err = store
            .create_user("alice2", "a@x.com", "hash".to_string())
            .unwrap_err();
        assert!(is_constraint_violation(&err));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_name_is_constraint_violation() {
        let store = UserStore::in_memory().unwrap();
        store
            .create_user("alice", "a@x.com", "hash".to_string())
            .unwrap();

        let err = store
            .create_user("alice", "b@x.com", "hash".to_string())
            .unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn test_users_survive_reopen() {
        let temp_file = NamedTempFile::new().unwrap();
        {
            let store = UserStore::new(temp_file.path()).unwrap();
            store
                .create_user("bob", "b@x.com", "hash".to_string())
                .unwrap();
        }
        let store = UserStore::new(temp_file.path()).unwrap();
        assert!(store.get_user_by_name("bob").unwrap().is_some());
    }
}
