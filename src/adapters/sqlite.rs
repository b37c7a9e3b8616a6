//! SQLite-backed document store.
//!
//! One table per collection, keyed by the canonical address. `first_seen` is
//! written once; `kind` and `observed_at` are rewritten on every upsert.

use crate::domain::model::{AddressKind, AddressRecord, StoredRecord, UpsertOutcome};
use crate::domain::ports::{ConfigProvider, RecordSink};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_identifier;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub struct SqliteSink {
    conn: Mutex<Connection>,
    collection: String,
}

impl SqliteSink {
    /// Open or create the store at `path`, creating the collection table if needed.
    pub fn open<P: AsRef<Path>>(path: P, collection: &str) -> Result<Self> {
        validate_identifier("collection", collection)?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::debug!("Opened document store at {:?}", path);
        Self::with_connection(conn, collection)
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::open(config.database_path(), config.collection())
    }

    pub fn open_in_memory(collection: &str) -> Result<Self> {
        validate_identifier("collection", collection)?;
        Self::with_connection(Connection::open_in_memory()?, collection)
    }

    fn with_connection(conn: Connection, collection: &str) -> Result<Self> {
        let sink = Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
        };
        sink.init_schema()?;
        Ok(sink)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    key TEXT PRIMARY KEY,
                    kind TEXT NOT NULL,
                    first_seen TEXT NOT NULL,
                    observed_at TEXT NOT NULL
                )
                "#,
                self.collection
            ),
            [],
        )?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EtlError::ProcessingError {
            message: "document store connection lock poisoned".to_string(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.collection),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn get(&self, key: &str) -> Result<Option<StoredRecord>> {
        let conn = self.lock()?;
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                &format!(
                    "SELECT key, kind, first_seen, observed_at FROM {} WHERE key = ?",
                    self.collection
                ),
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(|(key, kind, first_seen, observed_at)| -> Result<StoredRecord> {
            let kind = kind
                .parse::<AddressKind>()
                .map_err(|message| EtlError::ProcessingError { message })?;
            Ok(StoredRecord {
                record: AddressRecord::new(key, kind, parse_timestamp(&observed_at)?),
                first_seen: parse_timestamp(&first_seen)?,
            })
        })
        .transpose()
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| EtlError::ProcessingError {
            message: format!("bad timestamp '{}' in document store: {}", value, e),
        })
}

impl RecordSink for SqliteSink {
    async fn upsert(&self, record: &AddressRecord) -> Result<UpsertOutcome> {
        let conn = self.lock()?;

        let exists = conn
            .query_row(
                &format!("SELECT 1 FROM {} WHERE key = ?", self.collection),
                params![record.key()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        let observed_at = record.observed_at().to_rfc3339();
        conn.execute(
            &format!(
                r#"
                INSERT INTO {} (key, kind, first_seen, observed_at)
                VALUES (?1, ?2, ?3, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    kind = excluded.kind,
                    observed_at = excluded.observed_at
                "#,
                self.collection
            ),
            params![record.key(), record.kind().as_str(), observed_at],
        )?;

        Ok(if exists {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use chrono::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let sink = SqliteSink::open_in_memory("blocklist").unwrap();
        let first = Utc::now();
        let later = first + Duration::hours(1);

        let outcome = sink
            .upsert(&AddressRecord::new("192.168.0.0/24", AddressKind::Range, first))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);

        let outcome = sink
            .upsert(&AddressRecord::new("192.168.0.0/24", AddressKind::Range, later))
            .await
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);

        assert_eq!(sink.count().unwrap(), 1);
        let stored = sink.get("192.168.0.0/24").unwrap().unwrap();
        assert_eq!(stored.first_seen, first);
        assert_eq!(stored.record.observed_at(), later);
        assert_eq!(stored.record.kind(), AddressKind::Range);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let sink = SqliteSink::open_in_memory("blocklist").unwrap();
        assert!(sink.get("10.0.0.1").unwrap().is_none());
        assert_eq!(sink.count().unwrap(), 0);
    }

    #[test]
    fn test_from_config_uses_database_and_collection() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            database: temp_dir
                .path()
                .join("feeds.db")
                .to_string_lossy()
                .into_owned(),
            collection: "firehol_level1".to_string(),
            ..Settings::default()
        };

        let sink = SqliteSink::from_config(&settings).unwrap();

        assert_eq!(sink.collection(), "firehol_level1");
        assert!(temp_dir.path().join("feeds.db").exists());
    }

    #[test]
    fn test_rejects_unsafe_collection_name() {
        assert!(SqliteSink::open_in_memory("x; DROP TABLE y").is_err());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("blocklist.db");

        {
            let sink = SqliteSink::open(&db_path, "firehol").unwrap();
            let record = AddressRecord::new("203.0.113.5", AddressKind::Single, Utc::now());
            tokio_test::block_on(sink.upsert(&record)).unwrap();
        }

        let sink = SqliteSink::open(&db_path, "firehol").unwrap();
        assert_eq!(sink.collection(), "firehol");
        assert_eq!(sink.count().unwrap(), 1);
        assert!(sink.get("203.0.113.5").unwrap().is_some());
    }
}
