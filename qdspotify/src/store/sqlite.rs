//! Stockage SQLite des collections
//!
//! Une seule table `documents (collection, doc_id, body)`; `body` contient le
//! document JSON. L'ordre d'insertion est conservé via `rowid`.

use super::{COLLECTIONS_UPDATES, CollectionStore, matches_query, staleness_document};
use crate::error::{Result, SpotifyError};
use crate::models::CollectionMember;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Debug)]
pub struct SqliteCollectionStore {
    conn: Mutex<Connection>,
}

impl SqliteCollectionStore {
    /// Ouvre (ou crée) la base au chemin donné
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use qdspotify::store::SqliteCollectionStore;
    ///
    /// let store = SqliteCollectionStore::open("store/collections.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| SpotifyError::Store(e.to_string()))?;
                info!("Created store directory: {}", parent.display());
            }
        }

        let conn = Connection::open(path)?;
        debug!("Opened collection store at {}", path.display());
        Self::init(conn)
    }

    /// Base en mémoire (tests)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL,
                body TEXT NOT NULL,
                PRIMARY KEY (collection, doc_id)
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SpotifyError::Store("store lock poisoned".into()))
    }

    fn read_bodies(&self, collection: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY rowid")?;
        let bodies = stmt
            .query_map([collection], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(bodies)
    }
}

#[async_trait]
impl CollectionStore for SqliteCollectionStore {
    async fn read_collection(&self, name: &str) -> Result<Vec<CollectionMember>> {
        self.read_bodies(name)?
            .iter()
            .map(|body| serde_json::from_str(body).map_err(SpotifyError::from))
            .collect()
    }

    async fn replace_collection(&self, name: &str, items: &[CollectionMember]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        insert_collection(&tx, name, items)?;
        tx.commit()?;
        debug!("Replaced collection {} with {} documents", name, items.len());
        Ok(())
    }

    async fn write_staleness(&self, name: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let conn = self.lock()?;
        upsert_staleness(&conn, name, timestamp)
    }

    async fn replace_collection_at(
        &self,
        name: &str,
        items: &[CollectionMember],
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        insert_collection(&tx, name, items)?;
        upsert_staleness(&tx, name, timestamp)?;
        tx.commit()?;
        debug!(
            "Replaced collection {} with {} documents at {}",
            name,
            items.len(),
            timestamp
        );
        Ok(())
    }

    async fn find_one(&self, collection: &str, query: &Value) -> Result<Value> {
        for body in self.read_bodies(collection)? {
            let doc: Value = serde_json::from_str(&body)?;
            if matches_query(&doc, query) {
                return Ok(doc);
            }
        }
        Err(SpotifyError::NoResults)
    }
}

/// Vide puis remplit une collection; l'appelant fournit la transaction
fn insert_collection(conn: &Connection, name: &str, items: &[CollectionMember]) -> Result<()> {
    conn.execute("DELETE FROM documents WHERE collection = ?1", [name])?;
    let mut insert = conn.prepare(
        "INSERT OR REPLACE INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)",
    )?;
    for item in items {
        let body = serde_json::to_string(item)?;
        insert.execute(params![name, item.id, body])?;
    }
    Ok(())
}

fn upsert_staleness(conn: &Connection, name: &str, timestamp: DateTime<Utc>) -> Result<()> {
    let body = serde_json::to_string(&staleness_document(name, timestamp)?)?;
    conn.execute(
        "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
         ON CONFLICT(collection, doc_id) DO UPDATE SET body = excluded.body",
        params![COLLECTIONS_UPDATES, name, body],
    )?;
    Ok(())
}
