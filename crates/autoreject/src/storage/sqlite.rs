//! SQLite-based settings storage

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use rusqlite_migration::{M, Migrations};

use super::SettingsStore;

/// Database migrations
///
/// Each migration is applied in order. The user_version pragma tracks which
/// migrations have been applied.
fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // Migration 1: Initial schema
        M::up(
            r#"
            -- String settings per user (marker, reply, sync start, cursor)
            CREATE TABLE settings (
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, name)
            );
            "#,
        ),
    ])
}

/// SQLite-based settings storage
pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
}

impl SqliteSettingsStore {
    /// Open (or create) the settings database at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())
            .with_context(|| format!("Failed to open database at {:?}", db_path.as_ref()))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(mut conn: Connection) -> Result<Self> {
        // Readers must not block on a cycle persisting its cursor
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            "#,
        )?;

        migrations()
            .to_latest(&mut conn)
            .context("Failed to run database migrations")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("settings database lock poisoned"))
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get_setting(&self, user_id: &str, name: &str) -> Result<Option<String>> {
        let conn = self.lock()?;

        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE user_id = ? AND name = ?",
                [user_id, name],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read setting {} for {}", name, user_id))?;

        Ok(value)
    }

    fn set_string(&self, user_id: &str, name: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT OR REPLACE INTO settings (user_id, name, value, updated_at)
             VALUES (?, ?, ?, ?)",
            params![user_id, name, value, Utc::now().to_rfc3339()],
        )
        .with_context(|| format!("Failed to write setting {} for {}", name, user_id))?;

        Ok(())
    }
}
