//! SQLite storage backend for incident collections

use super::traits::{
    CollectionKey, CollectionStore, CollectionSummary, OpenStore, StorageError, StorageResult,
};
use crate::model::IncidentCollection;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed collection store
///
/// One row per collection. Summary columns are kept beside the JSON snapshot
/// so listing does not deserialize every collection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn init_schema(conn: &Connection) -> StorageResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS collections (
                stem TEXT PRIMARY KEY,
                incident_type TEXT NOT NULL,
                languages_json TEXT NOT NULL,
                incident_type_uri TEXT NOT NULL,
                incident_count INTEGER NOT NULL,
                reference_text_count INTEGER NOT NULL,
                version TEXT NOT NULL,
                created_at TEXT NOT NULL,
                snapshot_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_collections_type
                ON collections(incident_type);

            PRAGMA journal_mode = WAL;
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    fn parse_date(raw: &str) -> StorageResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|e| StorageError::DateParse(format!("{}: {}", raw, e)))
    }
}

impl CollectionStore for SqliteStore {
    fn save(&self, collection: &IncidentCollection) -> StorageResult<CollectionKey> {
        let key = CollectionKey::of(collection);
        let languages_json = serde_json::to_string(&key.languages)?;
        let snapshot_json = serde_json::to_string(collection)?;

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO collections (
                stem, incident_type, languages_json, incident_type_uri,
                incident_count, reference_text_count, version, created_at, snapshot_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(stem) DO UPDATE SET
                incident_type = excluded.incident_type,
                languages_json = excluded.languages_json,
                incident_type_uri = excluded.incident_type_uri,
                incident_count = excluded.incident_count,
                reference_text_count = excluded.reference_text_count,
                version = excluded.version,
                created_at = excluded.created_at,
                snapshot_json = excluded.snapshot_json
            "#,
            params![
                key.stem(),
                key.incident_type,
                languages_json,
                collection.incident_type_uri,
                collection.len() as i64,
                collection.reference_text_count() as i64,
                collection.version,
                collection.created_at.to_rfc3339(),
                snapshot_json,
            ],
        )?;
        Ok(key)
    }

    fn load(&self, key: &CollectionKey) -> StorageResult<Option<IncidentCollection>> {
        let conn = self.conn()?;
        let snapshot: Option<String> = conn
            .query_row(
                "SELECT snapshot_json FROM collections WHERE stem = ?1",
                params![key.stem()],
                |row| row.get(0),
            )
            .optional()?;
        snapshot
            .map(|json| serde_json::from_str(&json).map_err(StorageError::from))
            .transpose()
    }

    fn list(&self) -> StorageResult<Vec<CollectionSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT incident_type, languages_json, incident_type_uri, incident_count,
                   reference_text_count, version, created_at
            FROM collections
            ORDER BY stem
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;

        let mut summaries = Vec::new();
        for row in rows {
            let (incident_type, languages_json, incident_type_uri, incidents, reference_texts, version, created_at) =
                row?;
            summaries.push(CollectionSummary {
                key: CollectionKey::new(incident_type, serde_json::from_str(&languages_json)?),
                incident_type_uri,
                incidents: incidents as usize,
                reference_texts: reference_texts as usize,
                version,
                created_at: Self::parse_date(&created_at)?,
            });
        }
        Ok(summaries)
    }

    fn delete(&self, key: &CollectionKey) -> StorageResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM collections WHERE stem = ?1", params![key.stem()])?;
        Ok(removed > 0)
    }
}

impl OpenStore for SqliteStore {
    fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
