//! # qdspotify - Cœur de Quick Discover
//!
//! Cette crate fournit la logique de Quick Discover au-dessus de l'API Web
//! Spotify : cache local des catégories et genres avec revalidation par TTL,
//! et gestion de la playlist « Quick Discover Finds » de l'utilisateur.
//!
//! ## Architecture
//!
//! - `QuickDiscoverClient` : façade utilisée par les routes HTTP
//! - `sync` : chargement cache-aside des collections (`CollectionSyncEngine`)
//! - `staleness` : politique de fraîcheur (`StalenessPolicy`)
//! - `store` : stockage des collections (SQLite ou mémoire)
//! - `playlist` : résolution de la playlist, déduplication et mutations
//! - `format` : projection des pistes Spotify en `TrackData`
//! - `api` : couche d'accès à l'API REST Spotify (`SpotifyApi`)
//! - `upstream` : trait `UpstreamClient` entre les moteurs et l'API
//!
//! ## Structure des modules
//!
//! ```text
//! qdspotify/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client principal
//! │   ├── models.rs           # Structures de données
//! │   ├── error.rs            # Gestion des erreurs
//! │   ├── upstream.rs         # Trait UpstreamClient
//! │   ├── api/
//! │   │   ├── mod.rs          # Client HTTP Spotify
//! │   │   ├── catalog.rs      # Catégories, genres, recherche
//! │   │   └── user.rs         # Profil et playlists utilisateur
//! │   ├── store/              # CollectionStore (SQLite, mémoire)
//! │   ├── playlist/           # Résolution, déduplication, mutations
//! │   ├── sync.rs             # CollectionSyncEngine
//! │   ├── staleness.rs        # StalenessPolicy
//! │   ├── format.rs           # TrackData
//! │   ├── config_ext.rs       # Extension de qdconfig
//! │   ├── api_rest.rs         # Routes axum (feature qdserver)
//! │   └── server_ext.rs       # Extension de qdserver (feature qdserver)
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use qdspotify::QuickDiscoverClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = qdconfig::Config::load_config("")?;
//!     let client = QuickDiscoverClient::from_config(&config)?;
//!
//!     let token = "BQD...";
//!     for category in client.load_categories(token).await? {
//!         println!("{} - {}", category.id, category.name);
//!     }
//!
//!     let user_id = client.current_user_id(token).await?;
//!     client.add_to_playlist(token, &user_id, "spotify:track:4uLU6hMCjMI75M1A2tKUQC").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Erreurs
//!
//! Les erreurs de l'API Spotify (`{"error": {"status", "message"}}`) sont
//! conservées telles quelles dans `SpotifyError::Upstream` et renvoyées au
//! client HTTP sans réinterprétation. L'ajout d'une piste déjà présente
//! produit un conflit 423 sans appel à Spotify.

pub mod api;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod format;
pub mod models;
pub mod playlist;
pub mod staleness;
pub mod store;
pub mod sync;
pub mod upstream;

#[cfg(feature = "qdserver")]
pub mod api_rest;

#[cfg(feature = "qdserver")]
pub mod server_ext;

pub use api::SpotifyApi;
pub use client::{QuickDiscoverClient, open_store};
pub use config_ext::{SpotifyConfigExt, StoreBackend};
pub use error::{Result, SpotifyError, UpstreamErrorObject};
pub use models::*;
pub use playlist::{PlaylistMutationEngine, PlaylistResolver};
pub use staleness::StalenessPolicy;
pub use store::{CollectionStore, MemoryCollectionStore, SqliteCollectionStore};
pub use sync::CollectionSyncEngine;
pub use upstream::UpstreamClient;

#[cfg(feature = "qdserver")]
pub use server_ext::SpotifyServerExt;
