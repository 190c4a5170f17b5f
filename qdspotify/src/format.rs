//! Projection des pistes Spotify en [`TrackData`]
//!
//! Formatting never fails: an item missing any required field (name, uri,
//! track number, first album image) becomes [`TrackData::placeholder`] at the
//! same position. `preview_url` is allowed to be null.

use crate::models::{RawPlaylistItem, RawTrack, TrackData};
use serde_json::Value;
use tracing::warn;

fn try_format(raw: &Value) -> Option<TrackData> {
    let name = raw.get("name")?.as_str()?;
    let track_uri = raw.get("uri")?.as_str()?;
    let track_num = u32::try_from(raw.get("track_number")?.as_u64()?).ok()?;
    let track_album_image = raw
        .get("album")?
        .get("images")?
        .get(0)?
        .get("url")?
        .as_str()?;

    let preview_url = match raw.get("preview_url") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_str()?.to_string()),
    };

    Some(TrackData {
        name: name.to_string(),
        preview_url,
        track_uri: track_uri.to_string(),
        track_num,
        track_album_image: track_album_image.to_string(),
    })
}

/// Formate un objet piste
pub fn format_track(raw: &RawTrack) -> TrackData {
    try_format(raw).unwrap_or_else(|| {
        warn!("Malformed track item, using placeholder");
        TrackData::placeholder()
    })
}

/// Formate un élément de playlist (`{"track": {...}}`)
///
/// Local files and removed tracks come back with a null `track`.
pub fn format_playlist_item(item: &RawPlaylistItem) -> TrackData {
    match item.get("track") {
        Some(track) => format_track(track),
        None => {
            warn!("Playlist item without track, using placeholder");
            TrackData::placeholder()
        }
    }
}

pub fn format_tracks(raw: &[RawTrack]) -> Vec<TrackData> {
    raw.iter().map(format_track).collect()
}

pub fn format_playlist_items(items: &[RawPlaylistItem]) -> Vec<TrackData> {
    items.iter().map(format_playlist_item).collect()
}
