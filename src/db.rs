use crate::model::AppData;
use anyhow::Context;
use log::debug;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "tutordesk.sqlite3";

/// Where the application state blob lives. The store only ever reads it once at
/// startup and rewrites it whole after every mutation.
pub trait StateStorage {
    fn load(&self) -> anyhow::Result<Option<AppData>>;
    fn save(&mut self, data: &AppData) -> anyhow::Result<()>;
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state(
            storage_key TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

pub struct SqliteStorage {
    conn: Connection,
    key: String,
}

impl SqliteStorage {
    pub fn new(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    pub fn open(workspace: &Path, key: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self::new(open_db(workspace)?, key))
    }

    /// Raw JSON as stored, for backups.
    pub fn load_payload(&self) -> anyhow::Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT payload FROM app_state WHERE storage_key = ?",
                [&self.key],
                |r| r.get::<_, String>(0),
            )
            .optional()
            .context("failed to read app_state")
    }
}

impl StateStorage for SqliteStorage {
    fn load(&self) -> anyhow::Result<Option<AppData>> {
        let Some(payload) = self.load_payload()? else {
            return Ok(None);
        };
        let data = serde_json::from_str(&payload)
            .with_context(|| format!("stored state under {} is not valid JSON", self.key))?;
        Ok(Some(data))
    }

    fn save(&mut self, data: &AppData) -> anyhow::Result<()> {
        let payload = serde_json::to_string(data).context("failed to serialize state")?;
        let updated_at = chrono::Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO app_state(storage_key, payload, updated_at) VALUES(?, ?, ?)
                 ON CONFLICT(storage_key) DO UPDATE SET
                   payload = excluded.payload,
                   updated_at = excluded.updated_at",
                (&self.key, &payload, &updated_at),
            )
            .context("failed to write app_state")?;
        debug!("saved state under {} ({} bytes)", self.key, payload.len());
        Ok(())
    }
}
