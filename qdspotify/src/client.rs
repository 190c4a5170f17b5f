//! Client principal de Quick Discover
//!
//! Ce module assemble l'API Spotify, le cache des collections et la gestion
//! de la playlist désignée derrière une seule façade.

use crate::api::SpotifyApi;
use crate::config_ext::{SpotifyConfigExt, StoreBackend};
use crate::error::{Result, SpotifyError};
use crate::format::{format_playlist_items, format_tracks};
use crate::models::*;
use crate::playlist::{PlaylistMutationEngine, PlaylistResolver};
use crate::staleness::StalenessPolicy;
use crate::store::{CollectionStore, MemoryCollectionStore, SqliteCollectionStore};
use crate::sync::CollectionSyncEngine;
use crate::upstream::UpstreamClient;
use futures::future::try_join_all;
use qdconfig::Config;
use std::sync::Arc;
use tracing::{debug, info};

/// Client Quick Discover haut-niveau
#[derive(Clone)]
pub struct QuickDiscoverClient {
    upstream: Arc<dyn UpstreamClient>,
    collections: CollectionSyncEngine,
    playlists: PlaylistMutationEngine,
}

impl QuickDiscoverClient {
    /// Crée un client à partir de ses composants
    ///
    /// # Arguments
    ///
    /// * `upstream` - Accès à l'API Spotify
    /// * `store` - Stockage des catégories et genres
    /// * `policy` - Durée de vie des collections stockées
    /// * `playlist_name` - Nom de la playlist désignée
    pub fn new(
        upstream: Arc<dyn UpstreamClient>,
        store: Arc<dyn CollectionStore>,
        policy: StalenessPolicy,
        playlist_name: impl Into<String>,
    ) -> Self {
        let resolver = PlaylistResolver::new(upstream.clone(), playlist_name);
        Self {
            collections: CollectionSyncEngine::new(store, policy),
            playlists: PlaylistMutationEngine::new(upstream.clone(), resolver),
            upstream,
        }
    }

    /// Crée un client depuis la configuration
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use qdspotify::QuickDiscoverClient;
    ///
    /// #[tokio::main]
    /// async fn main() -> anyhow::Result<()> {
    ///     let config = qdconfig::Config::load_config("")?;
    ///     let client = QuickDiscoverClient::from_config(&config)?;
    ///     Ok(())
    /// }
    /// ```
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut api = SpotifyApi::with_base_url(config.get_spotify_api_base_url())?;
        api.set_market(config.get_spotify_market());
        api.set_locale(config.get_spotify_locale());
        api.set_playlist_description(config.get_spotify_playlist_description());

        let store = open_store(config)?;
        let policy = StalenessPolicy::new(config.get_spotify_cache_ttl());

        info!(
            "Spotify client ready ({}, market {}, ttl {:?})",
            api.base_url(),
            api.market(),
            policy.ttl()
        );

        Ok(Self::new(
            Arc::new(api),
            store,
            policy,
            config.get_spotify_playlist_name(),
        ))
    }

    // ============ Collections ============

    /// Charge une collection de référence depuis le store ou Spotify
    pub async fn load_collection(
        &self,
        token: &str,
        name: CollectionName,
    ) -> Result<Vec<CollectionMember>> {
        self.collections
            .load(name, || self.upstream.fetch_collection(token, name))
            .await
    }

    pub async fn load_categories(&self, token: &str) -> Result<Vec<CollectionMember>> {
        self.load_collection(token, CollectionName::Categories).await
    }

    pub async fn load_genres(&self, token: &str) -> Result<Vec<CollectionMember>> {
        self.load_collection(token, CollectionName::Genres).await
    }

    // ============ Catalogue ============

    /// Playlists d'une catégorie avec leurs pistes
    ///
    /// Track listings are fetched concurrently; the first failure wins.
    pub async fn get_category_playlist(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<PlaylistNameAndTracks>> {
        let playlists = self
            .upstream
            .fetch_category_playlists(token, category_id)
            .await?;
        debug!("Category {} has {} playlists", category_id, playlists.len());

        try_join_all(playlists.into_iter().map(|playlist| async move {
            let items = self.upstream.fetch_playlist_tracks(token, &playlist.id).await?;
            Ok::<_, SpotifyError>(PlaylistNameAndTracks {
                playlist_name: playlist.name,
                playlist_tracks: format_playlist_items(&items),
            })
        }))
        .await
    }

    /// Pistes associées à un genre
    pub async fn get_genre_tracks(&self, token: &str, genre: &str) -> Result<Vec<TrackData>> {
        let raw = self.upstream.search_tracks_by_genre(token, genre).await?;
        Ok(format_tracks(&raw))
    }

    // ============ Playlist utilisateur ============

    pub async fn current_user_id(&self, token: &str) -> Result<String> {
        self.upstream.resolve_current_user_id(token).await
    }

    /// Pistes de la playlist désignée de l'utilisateur
    pub async fn get_user_playlist_tracks(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<TrackData>> {
        self.playlists.playlist_tracks(token, user_id).await
    }

    pub async fn add_to_playlist(
        &self,
        token: &str,
        user_id: &str,
        track_uris: &str,
    ) -> Result<String> {
        self.playlists.add(token, user_id, track_uris).await
    }

    pub async fn remove_from_playlist(
        &self,
        token: &str,
        user_id: &str,
        track_uris: &str,
    ) -> Result<String> {
        self.playlists.remove(token, user_id, track_uris).await
    }
}

/// Ouvre le store configuré (`spotify.store.backend`)
pub fn open_store(config: &Config) -> Result<Arc<dyn CollectionStore>> {
    match config.get_spotify_store_backend()? {
        StoreBackend::Sqlite => {
            let path = config.get_spotify_store_file()?;
            info!("Using SQLite collection store at {}", path.display());
            Ok(Arc::new(SqliteCollectionStore::open(path)?))
        }
        StoreBackend::Memory => {
            info!("Using in-memory collection store");
            Ok(Arc::new(MemoryCollectionStore::new()))
        }
    }
}
