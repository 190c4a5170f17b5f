//! Ajout et retrait de pistes sur la playlist désignée
//!
//! A mutation runs through [`MutationStage`]s in order; the first failing
//! stage ends it and its error is returned unchanged.

use super::dedup::filter_new_tracks;
use super::resolver::PlaylistResolver;
use crate::error::{Result, SpotifyError};
use crate::format::format_playlist_items;
use crate::models::{PlaylistMethod, PlaylistRef, TrackData};
use crate::upstream::UpstreamClient;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStage {
    Resolving,
    FetchingTracks,
    Deduplicating,
    Mutating,
}

impl fmt::Display for MutationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving playlist",
            Self::FetchingTracks => "fetching playlist tracks",
            Self::Deduplicating => "deduplicating",
            Self::Mutating => "mutating playlist",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct PlaylistMutationEngine {
    upstream: Arc<dyn UpstreamClient>,
    resolver: PlaylistResolver,
}

impl PlaylistMutationEngine {
    pub fn new(upstream: Arc<dyn UpstreamClient>, resolver: PlaylistResolver) -> Self {
        Self { upstream, resolver }
    }

    pub fn resolver(&self) -> &PlaylistResolver {
        &self.resolver
    }

    fn failed(stage: MutationStage, err: SpotifyError) -> SpotifyError {
        debug!("Playlist mutation stopped while {}: {}", stage, err);
        err
    }

    async fn current_tracks(&self, token: &str, playlist: &PlaylistRef) -> Result<Vec<TrackData>> {
        let items = self.upstream.fetch_playlist_tracks(token, &playlist.id).await?;
        Ok(format_playlist_items(&items))
    }

    /// Pistes de la playlist désignée (créée si absente)
    pub async fn playlist_tracks(&self, token: &str, user_id: &str) -> Result<Vec<TrackData>> {
        let playlist = self.resolver.resolve(token, user_id).await?;
        self.current_tracks(token, &playlist).await
    }

    /// Ajoute ou retire `candidates` (URIs séparées par des virgules)
    ///
    /// ADD only sends the URIs not already present and fails with a 423
    /// conflict, without calling Spotify, when none are left. REMOVE sends
    /// the candidates unfiltered. Returns the new snapshot id.
    pub async fn mutate(
        &self,
        token: &str,
        user_id: &str,
        candidates: &str,
        method: PlaylistMethod,
    ) -> Result<String> {
        let playlist = self
            .resolver
            .resolve(token, user_id)
            .await
            .map_err(|e| Self::failed(MutationStage::Resolving, e))?;

        let current = self
            .current_tracks(token, &playlist)
            .await
            .map_err(|e| Self::failed(MutationStage::FetchingTracks, e))?;

        let uris = match method {
            PlaylistMethod::Add => {
                let filtered = filter_new_tracks(candidates, &current);
                if filtered.is_empty() {
                    return Err(Self::failed(
                        MutationStage::Deduplicating,
                        SpotifyError::track_already_exists(),
                    ));
                }
                filtered
            }
            PlaylistMethod::Remove => candidates.to_string(),
        };

        let snapshot = self
            .upstream
            .mutate_playlist_track(token, &playlist.id, &uris, method)
            .await
            .map_err(|e| Self::failed(MutationStage::Mutating, e))?;

        info!("{} {} on playlist {} -> {}", method, uris, playlist.id, snapshot);
        Ok(snapshot)
    }

    pub async fn add(&self, token: &str, user_id: &str, candidates: &str) -> Result<String> {
        self.mutate(token, user_id, candidates, PlaylistMethod::Add)
            .await
    }

    pub async fn remove(&self, token: &str, user_id: &str, candidates: &str) -> Result<String> {
        self.mutate(token, user_id, candidates, PlaylistMethod::Remove)
            .await
    }
}
