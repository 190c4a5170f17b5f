//! Seam between the engines and the Spotify Web API
//!
//! [`crate::api::SpotifyApi`] is the production implementation; tests plug
//! in recording fakes.

use crate::error::Result;
use crate::models::{
    CollectionMember, CollectionName, PlaylistMethod, PlaylistRef, RawPlaylistItem, RawTrack,
};
use async_trait::async_trait;

#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches the full categories or genres collection
    async fn fetch_collection(
        &self,
        token: &str,
        name: CollectionName,
    ) -> Result<Vec<CollectionMember>>;

    /// Searches tracks tagged with a genre
    async fn search_tracks_by_genre(&self, token: &str, genre: &str) -> Result<Vec<RawTrack>>;

    /// Lists the playlists featured under a browse category
    async fn fetch_category_playlists(
        &self,
        token: &str,
        category_id: &str,
    ) -> Result<Vec<PlaylistRef>>;

    /// Lists the items of a playlist
    async fn fetch_playlist_tracks(
        &self,
        token: &str,
        playlist_id: &str,
    ) -> Result<Vec<RawPlaylistItem>>;

    /// Lists the playlists owned or followed by a user
    async fn fetch_user_playlists(&self, token: &str, user_id: &str) -> Result<Vec<PlaylistRef>>;

    /// Creates a private playlist for the user
    async fn create_playlist(&self, token: &str, user_id: &str, name: &str)
    -> Result<PlaylistRef>;

    /// Adds or removes a comma-separated list of track URIs
    ///
    /// Returns the new snapshot id of the playlist.
    async fn mutate_playlist_track(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &str,
        method: PlaylistMethod,
    ) -> Result<String>;

    /// Resolves the id of the user owning the token
    async fn resolve_current_user_id(&self, token: &str) -> Result<String>;
}
