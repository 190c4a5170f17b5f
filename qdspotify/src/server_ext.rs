//! Extension de qdserver::Server pour intégrer le client Quick Discover
//!
//! Ce module fournit un trait d'extension permettant d'ajouter le client et
//! ses endpoints à un serveur qdserver, sans que qdserver dépende de qdspotify.

use crate::api_rest::{SpotifyState, create_router};
use crate::client::QuickDiscoverClient;
use anyhow::Result;
use qdconfig::Config;
use std::sync::Arc;
use tracing::info;

/// Trait d'extension pour ajouter le support Spotify à un serveur qdserver
///
/// # Exemple
///
/// ```rust,no_run
/// use qdspotify::SpotifyServerExt;
/// use qdserver::ServerBuilder;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = qdconfig::Config::load_config("")?;
///     let mut server = ServerBuilder::new_configured(&config).build();
///
///     server.init_spotify_client_configured(&config).await?;
///
///     server.start().await?;
///     server.wait().await;
///     Ok(())
/// }
/// ```
pub trait SpotifyServerExt {
    /// Enregistre les routes HTTP pour un client déjà construit
    ///
    /// # Routes enregistrées
    ///
    /// - `GET /categories` - Catégories (cache local)
    /// - `GET /categories/{category_id}` - Playlists d'une catégorie et leurs pistes
    /// - `GET /genres` - Genres (cache local)
    /// - `GET /genres/{genre_id}` - Pistes d'un genre
    /// - `GET /playlist` - Pistes de la playlist désignée
    /// - `PUT /playlist/add?track_uri=` - Ajout de pistes
    /// - `DELETE /playlist/remove?track_uri=` - Retrait de pistes
    async fn init_spotify_client(
        &mut self,
        client: Arc<QuickDiscoverClient>,
    ) -> Result<Arc<QuickDiscoverClient>>;

    /// Construit le client depuis la configuration puis enregistre les routes
    async fn init_spotify_client_configured(
        &mut self,
        config: &Config,
    ) -> Result<Arc<QuickDiscoverClient>>;
}

impl SpotifyServerExt for qdserver::Server {
    async fn init_spotify_client(
        &mut self,
        client: Arc<QuickDiscoverClient>,
    ) -> Result<Arc<QuickDiscoverClient>> {
        let router = create_router(SpotifyState {
            client: client.clone(),
        });
        self.add_router("/", router).await;
        info!("Quick Discover routes registered");
        Ok(client)
    }

    async fn init_spotify_client_configured(
        &mut self,
        config: &Config,
    ) -> Result<Arc<QuickDiscoverClient>> {
        let client = QuickDiscoverClient::from_config(config)?;
        self.init_spotify_client(Arc::new(client)).await
    }
}
