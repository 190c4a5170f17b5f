//! Gestion de la playlist « Quick Discover Finds » de l'utilisateur

pub mod dedup;
pub mod mutation;
pub mod resolver;

pub use dedup::{filter_new_tracks, split_uris};
pub use mutation::{MutationStage, PlaylistMutationEngine};
pub use resolver::{DEFAULT_PLAYLIST_NAME, PlaylistResolver};
