//! Module d'accès aux données utilisateur (profil, playlists, mutations)

use super::SpotifyApi;
use super::catalog::Paging;
use crate::error::Result;
use crate::models::{PlaylistMethod, PlaylistRef};
use crate::playlist::dedup::split_uris;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Réponse de l'endpoint /me
#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
}

/// Réponse des endpoints de mutation
#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    snapshot_id: String,
}

#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
}

#[derive(Debug, Serialize)]
struct TrackUri<'a> {
    uri: &'a str,
}

/// Corps des mutations: `{uris}` pour l'ajout, `{tracks: [{uri}]}` pour le retrait
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MutationBody<'a> {
    Add { uris: Vec<&'a str> },
    Remove { tracks: Vec<TrackUri<'a>> },
}

impl<'a> MutationBody<'a> {
    fn new(uris: &'a str, method: PlaylistMethod) -> Self {
        let uris = split_uris(uris);
        match method {
            PlaylistMethod::Add => MutationBody::Add { uris },
            PlaylistMethod::Remove => MutationBody::Remove {
                tracks: uris.into_iter().map(|uri| TrackUri { uri }).collect(),
            },
        }
    }

    fn len(&self) -> usize {
        match self {
            MutationBody::Add { uris } => uris.len(),
            MutationBody::Remove { tracks } => tracks.len(),
        }
    }
}

impl SpotifyApi {
    /// Récupère l'identifiant de l'utilisateur courant
    pub async fn get_me(&self, token: &str) -> Result<String> {
        let me: MeResponse = self.get(token, &["me"], &[]).await?;
        Ok(me.id)
    }

    /// Récupère les playlists d'un utilisateur
    pub async fn get_user_playlists(&self, token: &str, user_id: &str) -> Result<Vec<PlaylistRef>> {
        let params = [("limit", "50"), ("offset", "0")];
        let response: Paging<Option<PlaylistRef>> = self
            .get(token, &["users", user_id, "playlists"], &params)
            .await?;
        Ok(response.items.into_iter().flatten().collect())
    }

    /// Crée une playlist privée
    pub async fn create_private_playlist(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<PlaylistRef> {
        let body = CreatePlaylistBody {
            name,
            description: &self.playlist_description,
            public: false,
        };
        let playlist: PlaylistRef = self
            .send_json(Method::POST, token, &["users", user_id, "playlists"], &[], &body)
            .await?;
        info!("Created playlist {} ({}) for {}", playlist.name, playlist.id, user_id);
        Ok(playlist)
    }

    /// Ajoute ou retire des pistes de la playlist
    ///
    /// Added tracks go to the top of the playlist.
    pub async fn mutate_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &str,
        method: PlaylistMethod,
    ) -> Result<String> {
        let body = MutationBody::new(uris, method);
        let params: &[(&str, &str)] = match method {
            PlaylistMethod::Add => &[("position", "0")],
            PlaylistMethod::Remove => &[],
        };
        debug!("{} {} tracks on {}", method, body.len(), playlist_id);

        let response: SnapshotResponse = self
            .send_json(
                method.http_method(),
                token,
                &["playlists", playlist_id, "tracks"],
                params,
                &body,
            )
            .await?;
        Ok(response.snapshot_id)
    }
}
