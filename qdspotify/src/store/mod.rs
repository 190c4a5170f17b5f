//! Stockage local des collections de référence
//!
//! A store holds named collections of JSON documents. The categories and
//! genres snapshots live in collections named after them, and refresh
//! timestamps live in [`COLLECTIONS_UPDATES`].

mod memory;
mod sqlite;

pub use memory::MemoryCollectionStore;
pub use sqlite::SqliteCollectionStore;

use crate::error::{Result, SpotifyError};
use crate::models::{CollectionMember, StalenessRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

/// Collection des horodatages de rafraîchissement
pub const COLLECTIONS_UPDATES: &str = "collectionsUpdates";

#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Reads a whole collection in insertion order
    async fn read_collection(&self, name: &str) -> Result<Vec<CollectionMember>>;

    /// Replaces the content of a collection in one step
    ///
    /// Readers see either the previous snapshot or the new one.
    async fn replace_collection(&self, name: &str, items: &[CollectionMember]) -> Result<()>;

    /// Upserts the refresh timestamp of a collection
    async fn write_staleness(&self, name: &str, timestamp: DateTime<Utc>) -> Result<()>;

    /// Replaces a collection and records its refresh time as one write
    ///
    /// Backends override this so that a failure leaves both the snapshot and
    /// its timestamp as they were.
    async fn replace_collection_at(
        &self,
        name: &str,
        items: &[CollectionMember],
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.replace_collection(name, items).await?;
        self.write_staleness(name, timestamp).await
    }

    /// Returns the first document whose top-level fields equal those of `query`
    ///
    /// Fails with [`SpotifyError::NoResults`] when nothing matches.
    async fn find_one(&self, collection: &str, query: &Value) -> Result<Value>;

    async fn read_staleness(&self, name: &str) -> Result<Option<StalenessRecord>> {
        match self.find_one(COLLECTIONS_UPDATES, &json!({ "name": name })).await {
            Ok(doc) => Ok(Some(serde_json::from_value(doc)?)),
            Err(SpotifyError::NoResults) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Égalité champ à champ sur les clés de premier niveau
pub(crate) fn matches_query(doc: &Value, query: &Value) -> bool {
    match query.as_object() {
        Some(fields) => fields.iter().all(|(key, expected)| doc.get(key) == Some(expected)),
        None => false,
    }
}

pub(crate) fn staleness_document(name: &str, timestamp: DateTime<Utc>) -> Result<Value> {
    Ok(serde_json::to_value(StalenessRecord {
        name: name.to_string(),
        last_updated: timestamp,
    })?)
}
