//! Key-value storage backends for the persisted records.
//!
//! Records are whole JSON documents stored under a string key; the store
//! itself knows nothing about their shape.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Volatile store used by tests and as the fallback when disk writes fail
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per record inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        // readers only ever see a complete record
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, self.path_for(key))?;
        Ok(())
    }
}

/// Records kept in a single SQLite table
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &mut dyn KeyValueStore) {
        assert_eq!(store.get("wpmSettings").unwrap(), None);
        store.set("wpmSettings", "{\"a\":1}").unwrap();
        assert_eq!(store.get("wpmSettings").unwrap().as_deref(), Some("{\"a\":1}"));
        store.set("wpmSettings", "{\"a\":2}").unwrap();
        assert_eq!(store.get("wpmSettings").unwrap().as_deref(), Some("{\"a\":2}"));
        // keys are independent
        assert_eq!(store.get("wpmStats").unwrap(), None);
    }

    #[test]
    fn memory_store_last_write_wins() {
        exercise(&mut MemoryStore::new());
    }

    #[test]
    fn file_store_last_write_wins() {
        let dir = tempdir().unwrap();
        exercise(&mut FileStore::with_dir(dir.path().join("nested")));
    }

    #[test]
    fn file_store_uses_one_file_per_key() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::with_dir(dir.path());
        store.set("wpmStats", "{}").unwrap();
        assert!(dir.path().join("wpmStats.json").exists());
        assert!(!dir.path().join(".wpmStats.json.tmp").exists());
    }

    #[test]
    fn sqlite_store_last_write_wins() {
        exercise(&mut SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("wpmStats", "{\"bestWPM\":42}").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("wpmStats").unwrap().as_deref(),
            Some("{\"bestWPM\":42}")
        );
    }
}
