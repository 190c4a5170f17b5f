//! Recherche ou création de la playlist désignée

use crate::error::Result;
use crate::models::PlaylistRef;
use crate::upstream::UpstreamClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Nom par défaut de la playlist alimentée par l'application
pub const DEFAULT_PLAYLIST_NAME: &str = "Quick Discover Finds";

#[derive(Clone)]
pub struct PlaylistResolver {
    upstream: Arc<dyn UpstreamClient>,
    designated_name: String,
}

impl PlaylistResolver {
    pub fn new(upstream: Arc<dyn UpstreamClient>, designated_name: impl Into<String>) -> Self {
        Self {
            upstream,
            designated_name: designated_name.into(),
        }
    }

    pub fn designated_name(&self) -> &str {
        &self.designated_name
    }

    /// Première playlist dont le nom est exactement le nom désigné
    pub fn find<'a>(&self, existing: &'a [PlaylistRef]) -> Option<&'a PlaylistRef> {
        existing.iter().find(|p| p.name == self.designated_name)
    }

    /// Retourne la playlist désignée parmi `existing`, ou la crée
    pub async fn find_or_create(
        &self,
        token: &str,
        user_id: &str,
        existing: &[PlaylistRef],
    ) -> Result<PlaylistRef> {
        if let Some(playlist) = self.find(existing) {
            debug!("Using existing playlist {} ({})", playlist.name, playlist.id);
            return Ok(playlist.clone());
        }

        info!(
            "No playlist named {:?} for {}, creating it",
            self.designated_name, user_id
        );
        self.upstream
            .create_playlist(token, user_id, &self.designated_name)
            .await
    }

    /// Lists the user's playlists, then finds or creates the designated one
    pub async fn resolve(&self, token: &str, user_id: &str) -> Result<PlaylistRef> {
        let existing = self.upstream.fetch_user_playlists(token, user_id).await?;
        self.find_or_create(token, user_id, &existing).await
    }
}
