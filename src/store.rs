use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::StoreError;

/// One persisted rate snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Local>,
    pub wpm: u32,
    pub user_id: String,
}

impl Sample {
    pub fn new(timestamp: DateTime<Local>, wpm: u32, user_id: impl Into<String>) -> Self {
        Self {
            timestamp,
            wpm,
            user_id: user_id.into(),
        }
    }
}

/// Record store the tracker writes samples to.
///
/// `fetch_all` returns samples ordered by timestamp, oldest first,
/// whatever order they were appended in.
pub trait SampleStore {
    fn append(&mut self, sample: &Sample) -> Result<(), StoreError>;
    fn fetch_all(&self) -> Result<Vec<Sample>, StoreError>;
}

/// Volatile store for tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    samples: Vec<Sample>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl SampleStore for MemoryStore {
    fn append(&mut self, sample: &Sample) -> Result<(), StoreError> {
        self.samples.push(sample.clone());
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Sample>, StoreError> {
        let mut samples = self.samples.clone();
        // stable, so equal timestamps keep insertion order
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS samples (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ts_millis INTEGER NOT NULL,
        timestamp TEXT NOT NULL,
        wpm INTEGER NOT NULL,
        user_id TEXT NOT NULL,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// SQLite-backed sample store
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent directories
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_samples_ts ON samples(ts_millis)",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM samples", [], |row| row.get(0))?;
        Ok(n)
    }
}

impl SampleStore for SqliteStore {
    fn append(&mut self, sample: &Sample) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO samples (ts_millis, timestamp, wpm, user_id) VALUES (?1, ?2, ?3, ?4)",
            params![
                sample.timestamp.timestamp_millis(),
                sample.timestamp.to_rfc3339(),
                sample.wpm,
                sample.user_id,
            ],
        )?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Sample>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, timestamp, wpm, user_id
            FROM samples
            ORDER BY ts_millis ASC, id ASC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut samples = Vec::new();
        for row in rows {
            let (id, ts, wpm, user_id) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&ts)
                .map_err(|_| StoreError::Timestamp {
                    row: id,
                    value: ts.clone(),
                })?
                .with_timezone(&Local);
            samples.push(Sample {
                timestamp,
                wpm,
                user_id,
            });
        }

        Ok(samples)
    }
}
