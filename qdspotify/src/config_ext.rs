//! Extension pour intégrer la configuration Spotify dans qdconfig
//!
//! Ce module fournit le trait `SpotifyConfigExt` qui ajoute à
//! `qdconfig::Config` les réglages de l'API Spotify, de la playlist désignée
//! et du stockage des collections.

use crate::api::{
    DEFAULT_API_BASE_URL, DEFAULT_LOCALE, DEFAULT_MARKET, DEFAULT_PLAYLIST_DESCRIPTION,
};
use crate::playlist::DEFAULT_PLAYLIST_NAME;
use crate::staleness::DEFAULT_TTL;
use anyhow::{Result, anyhow};
use qdconfig::Config;
use serde_yaml::Value;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Nom du fichier SQLite dans le répertoire du store
pub const STORE_FILE_NAME: &str = "collections.db";

/// Backend de stockage des collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!("Unknown store backend: {}", other)),
        }
    }
}

/// Trait d'extension pour gérer la configuration Spotify dans qdconfig
///
/// # Exemple
///
/// ```rust,no_run
/// use qdconfig::Config;
/// use qdspotify::SpotifyConfigExt;
///
/// let config = Config::load_config("")?;
/// println!("Playlist: {}", config.get_spotify_playlist_name());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub trait SpotifyConfigExt {
    /// URL de base de l'API Web Spotify
    fn get_spotify_api_base_url(&self) -> String;

    /// Marché (pays) des recherches
    fn get_spotify_market(&self) -> String;

    fn get_spotify_locale(&self) -> String;

    /// Nom de la playlist désignée
    fn get_spotify_playlist_name(&self) -> String;

    fn set_spotify_playlist_name(&self, name: &str) -> Result<()>;

    fn get_spotify_playlist_description(&self) -> String;

    /// Durée de vie des collections en cache
    fn get_spotify_cache_ttl(&self) -> Duration;

    fn set_spotify_cache_ttl(&self, ttl: Duration) -> Result<()>;

    /// Backend de stockage (`sqlite` ou `memory`)
    ///
    /// # Errors
    ///
    /// Retourne une erreur si la valeur configurée est inconnue
    fn get_spotify_store_backend(&self) -> Result<StoreBackend>;

    /// Chemin du fichier SQLite, dans le répertoire géré `spotify.store.path`
    fn get_spotify_store_file(&self) -> Result<PathBuf>;
}

impl SpotifyConfigExt for Config {
    fn get_spotify_api_base_url(&self) -> String {
        self.get_string_or(&["spotify", "api_base_url"], DEFAULT_API_BASE_URL)
    }

    fn get_spotify_market(&self) -> String {
        self.get_string_or(&["spotify", "market"], DEFAULT_MARKET)
    }

    fn get_spotify_locale(&self) -> String {
        self.get_string_or(&["spotify", "locale"], DEFAULT_LOCALE)
    }

    fn get_spotify_playlist_name(&self) -> String {
        self.get_string_or(&["spotify", "playlist", "name"], DEFAULT_PLAYLIST_NAME)
    }

    fn set_spotify_playlist_name(&self, name: &str) -> Result<()> {
        self.set_value(
            &["spotify", "playlist", "name"],
            Value::String(name.to_string()),
        )
    }

    fn get_spotify_playlist_description(&self) -> String {
        self.get_string_or(
            &["spotify", "playlist", "description"],
            DEFAULT_PLAYLIST_DESCRIPTION,
        )
    }

    fn get_spotify_cache_ttl(&self) -> Duration {
        let secs = self.get_u64_or(&["spotify", "cache", "ttl_secs"], DEFAULT_TTL.as_secs());
        Duration::from_secs(secs)
    }

    fn set_spotify_cache_ttl(&self, ttl: Duration) -> Result<()> {
        self.set_value(
            &["spotify", "cache", "ttl_secs"],
            Value::Number(ttl.as_secs().into()),
        )
    }

    fn get_spotify_store_backend(&self) -> Result<StoreBackend> {
        self.get_string_or(&["spotify", "store", "backend"], "sqlite")
            .parse()
    }

    fn get_spotify_store_file(&self) -> Result<PathBuf> {
        let dir = self.get_managed_dir(&["spotify", "store", "path"], "store")?;
        Ok(PathBuf::from(dir).join(STORE_FILE_NAME))
    }
}
