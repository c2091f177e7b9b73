//! SQLite-backed classification store.

use crate::domain::model::{Classification, ClassificationRecord, EntryId};
use crate::domain::ports::ClassificationStore;
use crate::utils::error::{Result, SyncError};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS songs (
    id            INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    song_id       INTEGER UNIQUE NOT NULL,
    artist        TEXT NOT NULL,
    title         TEXT NOT NULL,
    album         TEXT NOT NULL,
    modified_date INTEGER NOT NULL,
    creation_date INTEGER NOT NULL,
    url           TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS problematic_urls (
    id  INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
    url TEXT UNIQUE NOT NULL
);
CREATE INDEX IF NOT EXISTS song_id ON songs (song_id);
";

pub struct SqliteClassificationStore {
    conn: Mutex<Connection>,
}

impl SqliteClassificationStore {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path.as_ref())?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        tracing::debug!("Classification store schema ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SyncError::TaskFailed {
            message: "classification store mutex poisoned".to_string(),
        })
    }
}

fn from_unix(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl ClassificationStore for SqliteClassificationStore {
    fn classify(&self, id: EntryId, remote_modified_at: DateTime<Utc>) -> Result<Classification> {
        let conn = self.lock()?;
        let stored: Option<i64> = conn
            .query_row(
                "SELECT modified_date FROM songs WHERE song_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(match stored {
            None => Classification::NotHandled,
            Some(secs) if remote_modified_at.timestamp() > secs => Classification::Outdated,
            Some(_) => Classification::Handled,
        })
    }

    fn insert(&self, record: &ClassificationRecord) -> Result<bool> {
        let conn = self.lock()?;
        let written = conn.execute(
            "INSERT OR IGNORE INTO songs
                (song_id, artist, title, album, modified_date, creation_date, url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.artist,
                record.title,
                record.album,
                record.modified_at.timestamp(),
                record.created_at.timestamp(),
                record.url,
            ],
        )?;
        Ok(written > 0)
    }

    fn update_modified_at(&self, id: EntryId, modified_at: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE songs SET modified_date = ?1 WHERE song_id = ?2",
            params![modified_at.timestamp(), id],
        )?;
        Ok(())
    }

    fn get(&self, id: EntryId) -> Result<Option<ClassificationRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT song_id, artist, title, album, modified_date, creation_date, url
                 FROM songs WHERE song_id = ?1",
                params![id],
                |row| {
                    Ok(ClassificationRecord {
                        id: row.get(0)?,
                        artist: row.get(1)?,
                        title: row.get(2)?,
                        album: row.get(3)?,
                        modified_at: from_unix(row.get(4)?),
                        created_at: from_unix(row.get(5)?),
                        url: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn mark_problematic(&self, url: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO problematic_urls (url) VALUES (?1)",
            params![url],
        )?;
        Ok(())
    }

    fn is_problematic(&self, url: &str) -> Result<bool> {
        let conn = self.lock()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM problematic_urls WHERE url = ?1)",
            params![url],
            |row| row.get(0),
        )?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn record(id: EntryId, artist: &str, modified: i64) -> ClassificationRecord {
        ClassificationRecord {
            id,
            artist: artist.to_string(),
            title: "Title".to_string(),
            album: "Album".to_string(),
            modified_at: at(modified),
            created_at: at(1),
            url: "https://example.com/dl".to_string(),
        }
    }

    #[test]
    fn test_insert_is_idempotent() {
        let store = SqliteClassificationStore::open_in_memory().unwrap();

        assert!(store.insert(&record(1, "A", 100)).unwrap());
        assert!(!store.insert(&record(1, "B", 500)).unwrap());

        let stored = store.get(1).unwrap().unwrap();
        assert_eq!(stored.artist, "A");
        assert_eq!(stored.modified_at, at(100));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_classification() {
        let store = SqliteClassificationStore::open_in_memory().unwrap();

        assert_eq!(store.classify(5, at(0)).unwrap(), Classification::NotHandled);
        assert_eq!(store.classify(5, at(9_999)).unwrap(), Classification::NotHandled);

        store.insert(&record(5, "A", 100)).unwrap();
        assert_eq!(store.classify(5, at(50)).unwrap(), Classification::Handled);
        assert_eq!(store.classify(5, at(100)).unwrap(), Classification::Handled);
        assert_eq!(store.classify(5, at(150)).unwrap(), Classification::Outdated);
    }

    #[test]
    fn test_update_modified_at() {
        let store = SqliteClassificationStore::open_in_memory().unwrap();
        store.insert(&record(5, "A", 100)).unwrap();

        store.update_modified_at(5, at(150)).unwrap();
        assert_eq!(store.classify(5, at(120)).unwrap(), Classification::Handled);
        assert_eq!(store.classify(5, at(200)).unwrap(), Classification::Outdated);

        let stored = store.get(5).unwrap().unwrap();
        assert_eq!(stored.modified_at, at(150));
        assert_eq!(stored.artist, "A");
    }

    #[test]
    fn test_update_missing_record_is_noop() {
        let store = SqliteClassificationStore::open_in_memory().unwrap();
        store.update_modified_at(42, at(150)).unwrap();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn test_problematic_urls() {
        let store = SqliteClassificationStore::open_in_memory().unwrap();
        let url = "https://example.com/broken";

        assert!(!store.is_problematic(url).unwrap());
        store.mark_problematic(url).unwrap();
        store.mark_problematic(url).unwrap();
        assert!(store.is_problematic(url).unwrap());
        assert!(!store.is_problematic("https://example.com/other").unwrap());
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen.sqlite");

        {
            let store = SqliteClassificationStore::open(&path).unwrap();
            store.insert(&record(9, "Persisted", 100)).unwrap();
            store.mark_problematic("https://example.com/x").unwrap();
        }

        let store = SqliteClassificationStore::open(&path).unwrap();
        assert_eq!(store.get(9).unwrap().unwrap().artist, "Persisted");
        assert!(store.is_problematic("https://example.com/x").unwrap());
    }
}
