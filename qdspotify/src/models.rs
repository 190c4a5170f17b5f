//! Modèles de données pour Quick Discover
//!
//! Track payloads coming from Spotify are kept as raw JSON ([`RawTrack`],
//! [`RawPlaylistItem`]) and only projected into [`TrackData`] by the
//! formatter, so a single malformed item never fails a whole response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Objet piste Spotify brut (résultat de recherche)
pub type RawTrack = serde_json::Value;

/// Élément de playlist Spotify brut (`{"track": {...}}`)
pub type RawPlaylistItem = serde_json::Value;

/// Collections de référence mises en cache localement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionName {
    Categories,
    Genres,
}

impl CollectionName {
    pub const ALL: [CollectionName; 2] = [CollectionName::Categories, CollectionName::Genres];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Genres => "genres",
        }
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "categories" => Ok(Self::Categories),
            "genres" => Ok(Self::Genres),
            other => Err(format!("unknown collection: {}", other)),
        }
    }
}

/// Catégorie ou genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMember {
    pub id: String,
    pub name: String,
}

impl CollectionMember {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Horodatage du dernier rafraîchissement d'une collection
///
/// Stored as `{"name": "...", "last_updated": <epoch millis>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessRecord {
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
}

/// Projection d'une piste pour le client web
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackData {
    pub name: String,
    #[serde(rename = "previewURL")]
    pub preview_url: Option<String>,
    #[serde(rename = "trackURI")]
    pub track_uri: String,
    #[serde(rename = "trackNum")]
    pub track_num: u32,
    #[serde(rename = "trackAlbumImage")]
    pub track_album_image: String,
}

impl TrackData {
    /// Entrée de remplacement pour un élément illisible
    pub fn placeholder() -> Self {
        Self {
            name: String::new(),
            preview_url: Some(String::new()),
            track_uri: String::new(),
            track_num: 0,
            track_album_image: String::new(),
        }
    }

    /// Placeholders carry no URI and cannot be added or removed
    pub fn is_actionable(&self) -> bool {
        !self.track_uri.is_empty()
    }
}

/// Une playlist de catégorie et ses pistes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistNameAndTracks {
    #[serde(rename = "playlistName")]
    pub playlist_name: String,
    #[serde(rename = "playlistTracks")]
    pub playlist_tracks: Vec<TrackData>,
}

/// Playlist Spotify (champs utilisés seulement)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub public: Option<bool>,
}

/// Opération de mutation sur la playlist désignée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlaylistMethod {
    Add,
    Remove,
}

impl PlaylistMethod {
    pub fn http_method(&self) -> reqwest::Method {
        match self {
            Self::Add => reqwest::Method::POST,
            Self::Remove => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for PlaylistMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => f.write_str("ADD"),
            Self::Remove => f.write_str("REMOVE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_track_data_wire_names() {
        let track = TrackData {
            name: "Song".into(),
            preview_url: None,
            track_uri: "spotify:track:1".into(),
            track_num: 3,
            track_album_image: "http://img".into(),
        };
        assert_eq!(
            serde_json::to_value(&track).unwrap(),
            json!({
                "name": "Song",
                "previewURL": null,
                "trackURI": "spotify:track:1",
                "trackNum": 3,
                "trackAlbumImage": "http://img"
            })
        );
    }

    #[test]
    fn test_staleness_record_uses_epoch_millis() {
        let record = StalenessRecord {
            name: "genres".into(),
            last_updated: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"name": "genres", "last_updated": 1_700_000_000_123i64}));
        let back: StalenessRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_collection_name_parsing() {
        assert_eq!("genres".parse::<CollectionName>(), Ok(CollectionName::Genres));
        assert!("artists".parse::<CollectionName>().is_err());
        assert_eq!(CollectionName::Categories.to_string(), "categories");
    }

    #[test]
    fn test_placeholder_is_not_actionable() {
        assert!(!TrackData::placeholder().is_actionable());
    }
}
