//! Token Blacklist
//! Mission: Remember revoked session tokens until they would have expired anyway

use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Revoked tokens keyed by token text, indexed by expiry for pruning
pub struct BlacklistStore {
    conn: Arc<Mutex<Connection>>,
}

impl BlacklistStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("open blacklist db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS token_blacklist (
                token TEXT PRIMARY KEY,
                expires_at INTEGER NOT NULL,
                revoked_at INTEGER NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_token_blacklist_expires ON token_blacklist(expires_at)",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Blacklist `token` until `expires_at` (unix seconds). Revoking twice is a no-op.
    pub fn revoke(&self, token: &str, expires_at: i64) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR IGNORE INTO token_blacklist (token, expires_at, revoked_at)
             VALUES (?1, ?2, ?3)",
            params![token, expires_at, Utc::now().timestamp()],
        )
        .context("Failed to blacklist token")?;
        Ok(())
    }

    pub fn is_revoked(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare_cached("SELECT 1 FROM token_blacklist WHERE token = ?1 LIMIT 1")?;
        let found = stmt
            .exists(params![token])
            .context("Failed to check token blacklist")?;
        Ok(found)
    }

    /// Drop entries whose token expired before `now`; returns how many went
    pub fn prune_expired(&self, now: i64) -> Result<usize> {
        let conn = self.conn.lock();
        let removed = conn
            .execute(
                "DELETE FROM token_blacklist WHERE expires_at < ?1",
                params![now],
            )
            .context("Failed to prune token blacklist")?;
        if removed > 0 {
            debug!("Pruned {} expired blacklist entries", removed);
        }
        Ok(removed)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM token_blacklist", [], |row| {
            row.get(0)
        })?;
        Ok(n as usize)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
