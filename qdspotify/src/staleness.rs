//! Politique de fraîcheur des collections

use crate::models::StalenessRecord;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Durée de vie par défaut d'une collection (1 heure)
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Decides whether a cached collection must be refetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StalenessPolicy {
    ttl: Duration,
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl StalenessPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True iff strictly more than `ttl` has elapsed since `last_updated`
    ///
    /// A timestamp in the future counts as fresh.
    pub fn is_expired(&self, last_updated: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match now.signed_duration_since(last_updated).to_std() {
            Ok(elapsed) => elapsed > self.ttl,
            Err(_) => false,
        }
    }

    /// Combines the timestamp check with the empty-collection and
    /// missing-record rules
    pub fn is_stale(
        &self,
        record: Option<&StalenessRecord>,
        collection_is_empty: bool,
        now: DateTime<Utc>,
    ) -> bool {
        if collection_is_empty {
            return true;
        }
        match record {
            Some(record) => self.is_expired(record.last_updated, now),
            None => true,
        }
    }
}
