//! Module d'accès au catalogue Spotify (catégories, genres, recherche, playlists)

use super::SpotifyApi;
use crate::error::Result;
use crate::models::{CollectionMember, PlaylistRef, RawPlaylistItem, RawTrack};
use serde::Deserialize;
use tracing::debug;

/// Réponse paginée de l'API
#[derive(Debug, Deserialize)]
pub(crate) struct Paging<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u32>,
}

/// Réponse de l'endpoint /browse/categories
#[derive(Debug, Deserialize)]
struct CategoriesResponse {
    categories: Paging<CollectionMember>,
}

/// Réponse de l'endpoint /recommendations/available-genre-seeds
#[derive(Debug, Deserialize)]
struct GenreSeedsResponse {
    genres: Vec<String>,
}

/// Réponse de l'endpoint /search
#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Paging<RawTrack>,
}

/// Réponse de l'endpoint /browse/categories/{id}/playlists
///
/// Spotify occasionally returns `null` entries in this listing.
#[derive(Debug, Deserialize)]
struct CategoryPlaylistsResponse {
    playlists: Paging<Option<PlaylistRef>>,
}

/// Réponse de l'endpoint /playlists/{id}?fields=tracks
#[derive(Debug, Deserialize)]
struct PlaylistTracksResponse {
    tracks: Paging<RawPlaylistItem>,
}

impl SpotifyApi {
    /// Récupère les catégories de navigation
    pub async fn get_categories(&self, token: &str) -> Result<Vec<CollectionMember>> {
        let params = [
            ("country", self.market.as_str()),
            ("locale", self.locale.as_str()),
            ("limit", "50"),
            ("offset", "0"),
        ];
        let response: CategoriesResponse = self.get(token, &["browse", "categories"], &params).await?;
        debug!("Fetched {} categories", response.categories.items.len());
        Ok(response.categories.items)
    }

    /// Récupère les genres disponibles comme graines de recommandation
    ///
    /// Each seed is both the id and the display name.
    pub async fn get_genre_seeds(&self, token: &str) -> Result<Vec<CollectionMember>> {
        let response: GenreSeedsResponse = self
            .get(token, &["recommendations", "available-genre-seeds"], &[])
            .await?;
        debug!("Fetched {} genre seeds", response.genres.len());
        Ok(response
            .genres
            .into_iter()
            .map(|genre| CollectionMember::new(genre.clone(), genre))
            .collect())
    }

    /// Recherche des pistes par genre
    pub async fn search_genre_tracks(&self, token: &str, genre: &str) -> Result<Vec<RawTrack>> {
        let query = format!("genre:{}", genre);
        let params = [
            ("q", query.as_str()),
            ("type", "track"),
            ("market", self.market.as_str()),
            ("offset", "0"),
            ("limit", "50"),
        ];
        let response: SearchResponse = self.get(token, &["search"], &params).await?;
        debug!(
            "Genre {} search returned {} tracks (total {:?})",
            genre,
            response.tracks.items.len(),
            response.tracks.total
        );
        Ok(response.tracks.items)
    }

    /// Récupère les playlists mises en avant pour une catégorie
    pub async fn get_category_playlists(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<PlaylistRef>> {
        let params = [
            ("country", self.market.as_str()),
            ("limit", "5"),
            ("offset", "0"),
        ];
        let response: CategoryPlaylistsResponse = self
            .get(token, &["browse", "categories", category_id, "playlists"], &params)
            .await?;
        Ok(response.playlists.items.into_iter().flatten().collect())
    }

    /// Récupère les éléments d'une playlist
    pub async fn get_playlist_items(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>> {
        let params = [("fields", "tracks"), ("market", self.market.as_str())];
        let response: PlaylistTracksResponse =
            self.get(token, &["playlists", playlist_id], &params).await?;
        Ok(response.tracks.items)
    }
}
