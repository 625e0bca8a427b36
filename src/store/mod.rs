//! Character and configuration persistence using SQLite.
//!
//! The schema mirrors what the tabletop application owns: config key/value
//! pairs, attribute definitions and per-player readings, attribute statuses
//! and free-form info fields. The portrait only reads it, apart from
//! [`Database::upsert_config`].

mod model;

pub use model::{
    AttributeRef, AttributeReading, AttributeStatusFlag, PlayerName, SideAttributeReading,
    UNKNOWN_NAME,
};

use anyhow::{Context, Result};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

/// Schema created on open.
///
/// ```sql
/// config(key TEXT PRIMARY KEY, value TEXT)
/// attribute(id INTEGER PRIMARY KEY, name TEXT UNIQUE)
/// player_attribute(player_id, attribute_id, value, max_value)
/// attribute_status(id INTEGER PRIMARY KEY, name TEXT UNIQUE)
/// player_attribute_status(player_id, attribute_status_id, value)
/// info(id INTEGER PRIMARY KEY, name TEXT UNIQUE)
/// player_info(player_id, info_id, value)
/// ```
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS config (
        key   TEXT PRIMARY KEY,
        value TEXT
    );
    CREATE TABLE IF NOT EXISTS attribute (
        id   INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );
    CREATE TABLE IF NOT EXISTS player_attribute (
        player_id    INTEGER NOT NULL,
        attribute_id INTEGER NOT NULL REFERENCES attribute(id),
        value        INTEGER NOT NULL DEFAULT 0,
        max_value    INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (player_id, attribute_id)
    );
    CREATE TABLE IF NOT EXISTS attribute_status (
        id   INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );
    CREATE TABLE IF NOT EXISTS player_attribute_status (
        player_id           INTEGER NOT NULL,
        attribute_status_id INTEGER NOT NULL REFERENCES attribute_status(id),
        value               INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (player_id, attribute_status_id)
    );
    CREATE TABLE IF NOT EXISTS info (
        id   INTEGER PRIMARY KEY,
        name TEXT UNIQUE NOT NULL
    );
    CREATE TABLE IF NOT EXISTS player_info (
        player_id INTEGER NOT NULL,
        info_id   INTEGER NOT NULL REFERENCES info(id),
        value     TEXT NOT NULL DEFAULT '',
        PRIMARY KEY (player_id, info_id)
    );
";

/// Text form a scalar config value is stored as.
///
/// Strings are stored verbatim, null as SQL NULL, anything else in its JSON form.
pub fn config_value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// SQLite-backed store. The connection is serialized behind a mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection lock poisoned"))
    }

    /// Value stored under `key`. A missing row and a NULL value both read as `None`.
    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value: Option<Option<String>> = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read config")?;
        Ok(value.flatten())
    }

    /// Inserts or overwrites the value stored under `key`.
    pub fn upsert_config(&self, key: &str, value: Option<&str>) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )
        .context("Failed to upsert config")?;
        Ok(())
    }

    /// Readings of `player_id` for the attributes named in `names`, ordered by attribute id.
    pub fn player_attributes(&self, player_id: i64, names: &[String]) -> Result<Vec<AttributeReading>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (0..names.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT pa.value, pa.max_value, a.id, a.name
             FROM player_attribute pa
             JOIN attribute a ON a.id = pa.attribute_id
             WHERE pa.player_id = ?1 AND a.name IN ({})
             ORDER BY a.id",
            placeholders
        );

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(&sql)
            .context("Failed to prepare attribute query")?;

        let mut bind: Vec<SqlValue> = Vec::with_capacity(names.len() + 1);
        bind.push(SqlValue::Integer(player_id));
        bind.extend(names.iter().map(|n| SqlValue::Text(n.clone())));

        let readings = stmt
            .query_map(params_from_iter(bind), |row| {
                Ok(AttributeReading {
                    value: row.get(0)?,
                    max_value: row.get(1)?,
                    attribute: AttributeRef {
                        id: row.get(2)?,
                        name: row.get(3)?,
                    },
                })
            })
            .context("Failed to query attributes")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read attributes")?;

        Ok(readings)
    }

    /// Reading of the attribute called `name` for `player_id`, if the character has one.
    pub fn side_attribute(&self, player_id: i64, name: &str) -> Result<Option<SideAttributeReading>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT pa.value, a.id, a.name
             FROM player_attribute pa
             JOIN attribute a ON a.id = pa.attribute_id
             WHERE pa.player_id = ?1 AND a.name = ?2
             LIMIT 1",
            params![player_id, name],
            |row| {
                Ok(SideAttributeReading {
                    value: row.get(0)?,
                    attribute: AttributeRef {
                        id: row.get(1)?,
                        name: row.get(2)?,
                    },
                })
            },
        )
        .optional()
        .context("Failed to read side attribute")
    }

    /// All status flags of `player_id`, ordered by status id.
    pub fn attribute_statuses(&self, player_id: i64) -> Result<Vec<AttributeStatusFlag>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT attribute_status_id, value
                 FROM player_attribute_status
                 WHERE player_id = ?1
                 ORDER BY attribute_status_id",
            )
            .context("Failed to prepare status query")?;

        let flags = stmt
            .query_map(params![player_id], |row| {
                Ok(AttributeStatusFlag {
                    status_id: row.get(0)?,
                    value: row.get(1)?,
                })
            })
            .context("Failed to query statuses")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read statuses")?;

        Ok(flags)
    }

    /// The info field called `info_name` for `player_id`, if present.
    pub fn player_info(&self, player_id: i64, info_name: &str) -> Result<Option<PlayerName>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT pi.value, pi.info_id
             FROM player_info pi
             JOIN info i ON i.id = pi.info_id
             WHERE pi.player_id = ?1 AND i.name = ?2
             LIMIT 1",
            params![player_id, info_name],
            |row| {
                Ok(PlayerName {
                    value: row.get(0)?,
                    info_id: row.get(1)?,
                })
            },
        )
        .optional()
        .context("Failed to read player info")
    }

    // Seeding. The tabletop application owns these writes; they exist for
    // bootstrapping a local database and for tests.

    pub fn insert_attribute(&self, name: &str) -> Result<i64> {
        self.insert_named("attribute", name)
    }

    pub fn insert_attribute_status(&self, name: &str) -> Result<i64> {
        self.insert_named("attribute_status", name)
    }

    pub fn insert_info(&self, name: &str) -> Result<i64> {
        self.insert_named("info", name)
    }

    fn insert_named(&self, table: &str, name: &str) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO {} (name) VALUES (?1)", table),
            params![name],
        )
        .with_context(|| format!("Failed to insert into {}", table))?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_player_attribute(
        &self,
        player_id: i64,
        attribute_id: i64,
        value: i64,
        max_value: i64,
    ) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO player_attribute (player_id, attribute_id, value, max_value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(player_id, attribute_id) DO UPDATE SET
                 value = excluded.value,
                 max_value = excluded.max_value",
            params![player_id, attribute_id, value, max_value],
        )
        .context("Failed to set player attribute")?;
        Ok(())
    }

    pub fn set_player_attribute_status(&self, player_id: i64, status_id: i64, value: bool) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO player_attribute_status (player_id, attribute_status_id, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(player_id, attribute_status_id) DO UPDATE SET value = excluded.value",
            params![player_id, status_id, value],
        )
        .context("Failed to set player attribute status")?;
        Ok(())
    }

    pub fn set_player_info(&self, player_id: i64, info_id: i64, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO player_info (player_id, info_id, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(player_id, info_id) DO UPDATE SET value = excluded.value",
            params![player_id, info_id, value],
        )
        .context("Failed to set player info")?;
        Ok(())
    }
}
