//! Stockage en mémoire des collections

use super::{COLLECTIONS_UPDATES, CollectionStore, matches_query, staleness_document};
use crate::error::{Result, SpotifyError};
use crate::models::CollectionMember;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Store volatile, perdu à l'arrêt du processus
///
/// # Exemple
///
/// ```
/// use qdspotify::{CollectionMember, CollectionStore, MemoryCollectionStore};
///
/// tokio_test::block_on(async {
///     let store = MemoryCollectionStore::new();
///     let genres = [CollectionMember::new("rock", "rock")];
///     store.replace_collection("genres", &genres).await.unwrap();
///
///     assert_eq!(store.read_collection("genres").await.unwrap().len(), 1);
///     assert!(store.read_staleness("genres").await.unwrap().is_none());
/// });
/// ```
#[derive(Debug, Default)]
pub struct MemoryCollectionStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn read_collection(&self, name: &str) -> Result<Vec<CollectionMember>> {
        let collections = self.collections.read().await;
        match collections.get(name) {
            Some(docs) => docs
                .iter()
                .map(|doc| serde_json::from_value(doc.clone()).map_err(SpotifyError::from))
                .collect(),
            None => Ok(Vec::new()),
        }
    }

    async fn replace_collection(&self, name: &str, items: &[CollectionMember]) -> Result<()> {
        let docs = to_documents(items)?;
        self.collections.write().await.insert(name.to_string(), docs);
        Ok(())
    }

    async fn write_staleness(&self, name: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let doc = staleness_document(name, timestamp)?;
        upsert_staleness(&mut *self.collections.write().await, name, doc);
        Ok(())
    }

    async fn replace_collection_at(
        &self,
        name: &str,
        items: &[CollectionMember],
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        // Serialise first so that nothing is written on failure
        let docs = to_documents(items)?;
        let doc = staleness_document(name, timestamp)?;

        let mut collections = self.collections.write().await;
        collections.insert(name.to_string(), docs);
        upsert_staleness(&mut collections, name, doc);
        Ok(())
    }

    async fn find_one(&self, collection: &str, query: &Value) -> Result<Value> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches_query(doc, query)))
            .cloned()
            .ok_or(SpotifyError::NoResults)
    }
}

fn to_documents(items: &[CollectionMember]) -> Result<Vec<Value>> {
    Ok(items
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?)
}

fn upsert_staleness(collections: &mut HashMap<String, Vec<Value>>, name: &str, doc: Value) {
    let updates = collections
        .entry(COLLECTIONS_UPDATES.to_string())
        .or_default();
    match updates
        .iter_mut()
        .find(|existing| existing.get("name").and_then(Value::as_str) == Some(name))
    {
        Some(existing) => *existing = doc,
        None => updates.push(doc),
    }
}
