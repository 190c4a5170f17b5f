//! Chargement cache-aside des collections de référence
//!
//! [`CollectionSyncEngine::load`] serves the stored snapshot while it is
//! fresh and otherwise refetches it. A failed fetch leaves the stored
//! snapshot and its timestamp untouched.

use crate::error::Result;
use crate::models::{CollectionMember, CollectionName};
use crate::staleness::StalenessPolicy;
use crate::store::CollectionStore;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct CollectionSyncEngine {
    store: Arc<dyn CollectionStore>,
    policy: StalenessPolicy,
}

impl CollectionSyncEngine {
    pub fn new(store: Arc<dyn CollectionStore>, policy: StalenessPolicy) -> Self {
        Self { store, policy }
    }

    pub fn store(&self) -> &Arc<dyn CollectionStore> {
        &self.store
    }

    pub fn policy(&self) -> StalenessPolicy {
        self.policy
    }

    /// Charge une collection, en la rafraîchissant si elle est périmée
    pub async fn load<F, Fut>(&self, name: CollectionName, fetch: F) -> Result<Vec<CollectionMember>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CollectionMember>>>,
    {
        self.load_at(name, Utc::now(), fetch).await
    }

    /// Same as [`load`](Self::load) with an explicit clock
    pub async fn load_at<F, Fut>(
        &self,
        name: CollectionName,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<Vec<CollectionMember>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<CollectionMember>>>,
    {
        let stored = self.store.read_collection(name.as_str()).await?;
        let record = self.store.read_staleness(name.as_str()).await?;

        if !self.policy.is_stale(record.as_ref(), stored.is_empty(), now) {
            debug!("Collection {} served from store ({} items)", name, stored.len());
            return Ok(stored);
        }

        info!("Collection {} is stale, refreshing from Spotify", name);
        let fresh = match fetch().await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!("Refresh of {} failed, keeping stored snapshot: {}", name, e);
                return Err(e);
            }
        };

        self.store
            .replace_collection_at(name.as_str(), &fresh, now)
            .await?;
        debug!("Collection {} refreshed with {} items", name, fresh.len());

        Ok(fresh)
    }
}
