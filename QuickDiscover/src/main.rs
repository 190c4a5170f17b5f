use qdconfig::Config;
use qdserver::logs::init_logging;
use qdserver::{LoggingOptions, ServerBuilder};
use qdspotify::{CollectionName, SpotifyServerExt};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ========== PHASE 1 : Logs et configuration ==========
    // Defaults until the configuration is loaded
    let log_state = init_logging(LoggingOptions::default());
    let config = Arc::new(Config::load_config("")?);
    if let Err(e) = log_state.apply(&LoggingOptions::from_config(&config)) {
        warn!("Keeping default logging options: {}", e);
    }

    let mut server = ServerBuilder::new_configured(&config).build();
    server.attach_logging(log_state).await;
    info!("Configuration loaded from {}", config.dir());

    // Routes de l'application
    server
        .add_route("/", || async { "Hello from Quick Discover" })
        .await;
    server
        .add_route("/info", || async {
            serde_json::json!({
                "name": "Quick Discover",
                "version": env!("CARGO_PKG_VERSION"),
                "collections": CollectionName::ALL.map(|c| c.as_str()),
            })
        })
        .await;

    // ========== PHASE 2 : Spotify ==========
    info!("Initializing Spotify client and collection store...");
    server.init_spotify_client_configured(&config).await?;

    // ========== PHASE 3 : Démarrage ==========
    let server_info = server.info();
    server.start().await?;
    info!(
        "Quick Discover listening on http://{}:{}",
        server_info.base_url, server_info.http_port
    );

    server.wait().await;
    info!("Server stopped");
    Ok(())
}
