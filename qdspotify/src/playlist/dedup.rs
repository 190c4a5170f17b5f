//! Filtrage des URIs déjà présentes dans une playlist

use crate::models::TrackData;
use std::collections::HashSet;

/// Splits a comma-separated URI list, trimming tokens and dropping empty ones
pub fn split_uris(uris: &str) -> Vec<&str> {
    uris.split(',')
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .collect()
}

/// Keeps the candidate URIs that are not already in `current`
///
/// The result preserves candidate order, drops repeats within the request
/// and is re-joined with commas. An empty string means nothing is left to add.
pub fn filter_new_tracks(candidates: &str, current: &[TrackData]) -> String {
    let existing: HashSet<&str> = current
        .iter()
        .filter(|track| track.is_actionable())
        .map(|track| track.track_uri.as_str())
        .collect();

    let mut seen = HashSet::new();
    split_uris(candidates)
        .into_iter()
        .filter(|uri| !existing.contains(uri) && seen.insert(*uri))
        .collect::<Vec<_>>()
        .join(",")
}
