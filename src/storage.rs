// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use directories::ProjectDirs;
use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StoreError;

/// Keys under which the independently persisted slices live.
pub mod keys {
    pub const EXPENSES: &str = "expenses";
    pub const CURRENCY: &str = "currency";
    pub const BUDGETS: &str = "budgets";
    pub const RECURRING: &str = "recurringExpenses";
}

/// Durable string-keyed blob store. Reads and writes may suspend; the store
/// never assumes a write has landed when a mutation returns.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Default on-device backend: a single key/value table in SQLite. Blocking
/// rusqlite calls run on the blocking pool.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Opens (or creates) the database in the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let path = default_db_path()?;
        Self::open(path)
    }

    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(&path)
            .map_err(|e| StoreError::Storage(format!("open {}: {}", path.display(), e)))?;
        Self::init(conn)
    }

    /// In-memory database, handy for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::storage)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .map_err(StoreError::storage)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // Poisoning only means a panicked writer; the connection stays usable.
            let conn = conn.lock().unwrap_or_else(|p| p.into_inner());
            f(&conn)
        })
        .await
        .map_err(StoreError::storage)?
        .map_err(StoreError::storage)
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        self.blocking(move |conn| {
            conn.query_row("SELECT value FROM kv WHERE key=?1", params![key], |r| r.get(0))
                .optional()
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let (key, value) = (key.to_string(), value.to_string());
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO kv(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![key, value],
            )
            .map(|_| ())
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        self.blocking(move |conn| {
            conn.execute("DELETE FROM kv WHERE key=?1", params![key]).map(|_| ())
        })
        .await
    }
}

fn default_db_path() -> Result<PathBuf, StoreError> {
    let proj = ProjectDirs::from("com.spendbook", "Spendbook", "spendbook")
        .ok_or_else(|| StoreError::Storage("no platform data dir".into()))?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)
        .map_err(|e| StoreError::Storage(format!("create {}: {}", data_dir.display(), e)))?;
    Ok(data_dir.join("spendbook.sqlite"))
}

/// Volatile backend for tests and embedding without durability.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let map = self.map.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.lock().map_err(|_| StoreError::Storage("poisoned".into()))?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_get_set_remove() {
        let s = MemoryStorage::new();
        assert!(s.get("expenses").await.unwrap().is_none());
        s.set("expenses", "[]").await.unwrap();
        assert_eq!(s.get("expenses").await.unwrap().as_deref(), Some("[]"));
        s.remove("expenses").await.unwrap();
        assert!(s.get("expenses").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sqlite_upserts() {
        let s = SqliteStorage::open_in_memory().unwrap();
        s.set("currency", "USD").await.unwrap();
        s.set("currency", "EUR").await.unwrap();
        assert_eq!(s.get("currency").await.unwrap().as_deref(), Some("EUR"));
        s.remove("currency").await.unwrap();
        assert!(s.get("currency").await.unwrap().is_none());
    }
}
