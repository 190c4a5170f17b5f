//! Couche d'accès à l'API REST Spotify
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec l'API Web
//! Spotify. Chaque requête porte le jeton d'accès de l'utilisateur.

pub mod catalog;
pub mod user;

use crate::error::{Result, SpotifyError, UpstreamErrorObject};
use crate::models::{
    CollectionMember, CollectionName, PlaylistMethod, PlaylistRef, RawPlaylistItem, RawTrack,
};
use crate::upstream::UpstreamClient;
use async_trait::async_trait;
use reqwest::{Client, Method, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de base de l'API Spotify
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Marché utilisé pour les recherches et les playlists
pub const DEFAULT_MARKET: &str = "US";

/// Locale utilisée pour le nom des catégories
pub const DEFAULT_LOCALE: &str = "us_EN";

/// Description des playlists créées
pub const DEFAULT_PLAYLIST_DESCRIPTION: &str =
    "Songs discovered through the Quick Discover web app";

/// Client API bas-niveau pour communiquer avec Spotify
pub struct SpotifyApi {
    /// Client HTTP
    client: Client,
    base_url: String,
    market: String,
    locale: String,
    playlist_description: String,
}

impl SpotifyApi {
    /// Crée une nouvelle instance pointant sur l'API publique
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Crée une instance pointant sur une autre URL (tests, proxy)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            market: DEFAULT_MARKET.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            playlist_description: DEFAULT_PLAYLIST_DESCRIPTION.to_string(),
        })
    }

    pub fn set_market(&mut self, market: impl Into<String>) {
        self.market = market.into();
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    pub fn set_playlist_description(&mut self, description: impl Into<String>) {
        self.playlist_description = description.into();
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn market(&self) -> &str {
        &self.market
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Construit l'URL d'un endpoint à partir de ses segments
    ///
    /// Each segment is percent-encoded, so identifiers cannot alter the path
    /// or add a query string.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SpotifyError::Format(format!("invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| SpotifyError::Format(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Effectue une requête GET à l'API
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        token: &str,
        endpoint: &[&str],
        params: &[(&str, &str)],
    ) -> Result<T> {
        self.request::<T, ()>(Method::GET, token, endpoint, params, None)
            .await
    }

    /// Effectue une requête avec un corps JSON
    pub(crate) async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        token: &str,
        endpoint: &[&str],
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<T> {
        self.request(method, token, endpoint, params, Some(body))
            .await
    }

    async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        token: &str,
        endpoint: &[&str],
        params: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T> {
        let url = self.url(endpoint)?;

        debug!("{} {} with {} params", method, url, params.len());

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .query(params);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        debug!("Response status: {}", status);

        let text = response.text().await?;

        if !status.is_success() {
            let object = UpstreamErrorObject::from_response_body(status.as_u16(), &text);
            warn!("Spotify API error ({})", object);
            return Err(SpotifyError::Upstream(object));
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            SpotifyError::JsonParse(e)
        })
    }
}

#[async_trait]
impl UpstreamClient for SpotifyApi {
    async fn fetch_collection(
        &self,
        token: &str,
        name: CollectionName,
    ) -> Result<Vec<CollectionMember>> {
        match name {
            CollectionName::Categories => self.get_categories(token).await,
            CollectionName::Genres => self.get_genre_seeds(token).await,
        }
    }

    async fn search_tracks_by_genre(&self, token: &str, genre: &str) -> Result<Vec<RawTrack>> {
        self.search_genre_tracks(token, genre).await
    }

    async fn fetch_category_playlists(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<PlaylistRef>> {
        self.get_category_playlists(token, category_id).await
    }

    async fn fetch_playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>> {
        self.get_playlist_items(token, playlist_id).await
    }

    async fn fetch_user_playlists(&self, token: &str, user_id: &str) -> Result<Vec<PlaylistRef>> {
        self.get_user_playlists(token, user_id).await
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<PlaylistRef> {
        self.create_private_playlist(token, user_id, name).await
    }

    async fn mutate_playlist_track(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &str,
        method: PlaylistMethod,
    ) -> Result<String> {
        self.mutate_tracks(token, playlist_id, uris, method).await
    }

    async fn resolve_current_user_id(&self, token: &str) -> Result<String> {
        self.get_me(token).await
    }
}
