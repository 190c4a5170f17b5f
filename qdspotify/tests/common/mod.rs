#![allow(dead_code)]

use async_trait::async_trait;
use qdspotify::{
    CollectionMember, CollectionName, PlaylistMethod, PlaylistRef, Result, SpotifyError,
    UpstreamClient, UpstreamErrorObject,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

pub const TOKEN: &str = "test-token";
pub const USER: &str = "user-1";
pub const PLAYLIST_NAME: &str = "Quick Discover Finds";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Raw Spotify track object
pub fn raw_track(uri: &str) -> Value {
    json!({
        "name": format!("Track {}", uri),
        "preview_url": null,
        "uri": uri,
        "track_number": 1,
        "album": {"images": [{"url": "http://img/1"}]}
    })
}

/// Raw playlist item wrapping a track
pub fn playlist_item(uri: &str) -> Value {
    json!({ "track": raw_track(uri) })
}

pub fn playlist(id: &str, name: &str) -> PlaylistRef {
    PlaylistRef {
        id: id.to_string(),
        name: name.to_string(),
        snapshot_id: None,
        public: Some(false),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchCollection(CollectionName),
    SearchGenre(String),
    CategoryPlaylists(String),
    PlaylistTracks(String),
    UserPlaylists(String),
    CreatePlaylist(String, String),
    Mutate {
        playlist_id: String,
        uris: String,
        method: PlaylistMethod,
    },
    CurrentUser,
}

#[derive(Debug, Clone)]
pub enum Failure {
    Upstream(UpstreamErrorObject),
    Hard,
}

impl Failure {
    fn to_error(&self) -> SpotifyError {
        match self {
            Failure::Upstream(object) => SpotifyError::Upstream(object.clone()),
            Failure::Hard => SpotifyError::Format("missing tracks.items".into()),
        }
    }
}

/// In-memory Spotify that records every call
#[derive(Default)]
pub struct FakeUpstream {
    pub calls: Mutex<Vec<Call>>,
    pub collections: Mutex<HashMap<CollectionName, Vec<CollectionMember>>>,
    pub genre_tracks: Mutex<Vec<Value>>,
    pub category_playlists: Mutex<Vec<PlaylistRef>>,
    pub user_playlists: Mutex<Vec<PlaylistRef>>,
    pub playlist_items: Mutex<HashMap<String, Vec<Value>>>,
    pub collection_failure: Mutex<Option<Failure>>,
    pub category_playlists_failure: Mutex<Option<Failure>>,
    pub create_failure: Mutex<Option<Failure>>,
    pub tracks_failure: Mutex<Option<Failure>>,
    pub user_playlists_failure: Mutex<Option<Failure>>,
    pub me_failure: Mutex<Option<Failure>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// A user owning the designated playlist `pl-1` with the given tracks
    pub fn with_designated_playlist(uris: &[&str]) -> Self {
        let fake = Self::new();
        fake.user_playlists.lock().unwrap().extend([
            playlist("other", "Road trip"),
            playlist("pl-1", PLAYLIST_NAME),
        ]);
        fake.playlist_items.lock().unwrap().insert(
            "pl-1".to_string(),
            uris.iter().map(|uri| playlist_item(uri)).collect(),
        );
        fake
    }

    pub fn set_collection(&self, name: CollectionName, members: Vec<CollectionMember>) {
        self.collections.lock().unwrap().insert(name, members);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Mutate { .. }))
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(failure: &Mutex<Option<Failure>>) -> Result<()> {
        match failure.lock().unwrap().as_ref() {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UpstreamClient for FakeUpstream {
    async fn fetch_collection(
        &self,
        _token: &str,
        name: CollectionName,
    ) -> Result<Vec<CollectionMember>> {
        self.record(Call::FetchCollection(name));
        Self::check(&self.collection_failure)?;
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(&name)
            .cloned()
            .unwrap_or_default())
    }

    async fn search_tracks_by_genre(&self, _token: &str, genre: &str) -> Result<Vec<Value>> {
        self.record(Call::SearchGenre(genre.to_string()));
        Self::check(&self.tracks_failure)?;
        Ok(self.genre_tracks.lock().unwrap().clone())
    }

    async fn fetch_category_playlists(
        &self,
        _token: &str,
        category_id: &str,
    ) -> Result<Vec<PlaylistRef>> {
        self.record(Call::CategoryPlaylists(category_id.to_string()));
        Self::check(&self.category_playlists_failure)?;
        Ok(self.category_playlists.lock().unwrap().clone())
    }

    async fn fetch_playlist_tracks(&self, _token: &str, playlist_id: &str) -> Result<Vec<Value>> {
        self.record(Call::PlaylistTracks(playlist_id.to_string()));
        Self::check(&self.tracks_failure)?;
        Ok(self
            .playlist_items
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_user_playlists(&self, _token: &str, user_id: &str) -> Result<Vec<PlaylistRef>> {
        self.record(Call::UserPlaylists(user_id.to_string()));
        Self::check(&self.user_playlists_failure)?;
        Ok(self.user_playlists.lock().unwrap().clone())
    }

    async fn create_playlist(
        &self,
        _token: &str,
        user_id: &str,
        name: &str,
    ) -> Result<PlaylistRef> {
        self.record(Call::CreatePlaylist(user_id.to_string(), name.to_string()));
        Self::check(&self.create_failure)?;
        let created = playlist("created-1", name);
        self.user_playlists.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn mutate_playlist_track(
        &self,
        _token: &str,
        playlist_id: &str,
        uris: &str,
        method: PlaylistMethod,
    ) -> Result<String> {
        self.record(Call::Mutate {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_string(),
            method,
        });

        let mut items = self.playlist_items.lock().unwrap();
        let current = items.entry(playlist_id.to_string()).or_default();
        for uri in uris.split(',').map(str::trim) {
            match method {
                PlaylistMethod::Add => current.insert(0, playlist_item(uri)),
                PlaylistMethod::Remove => {
                    current.retain(|item| item["track"]["uri"].as_str() != Some(uri))
                }
            }
        }
        Ok(format!("snapshot-{}", current.len()))
    }

    async fn resolve_current_user_id(&self, _token: &str) -> Result<String> {
        self.record(Call::CurrentUser);
        Self::check(&self.me_failure)?;
        Ok(USER.to_string())
    }
}
