//! # qdserver - Serveur web haut niveau basé sur Axum
//!
//! Cette crate fournit une abstraction simple pour créer le serveur HTTP de
//! Quick Discover. Les autres crates y montent leurs routes via des traits
//! d'extension (voir `qdspotify::SpotifyServerExt`), sans que `qdserver`
//! dépende d'elles.
//!
//! - [`server`] : serveur principal et builder
//! - [`logs`] : initialisation de `tracing` et réglage du niveau à chaud
//!
//! ## Exemple d'utilisation
//!
//! ```rust,no_run
//! use qdserver::{ServerBuilder, logs::LoggingOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = ServerBuilder::new("MyServer", "localhost", 8080).build();
//!     server.init_logging(LoggingOptions::default()).await;
//!
//!     server.add_route("/api/status", || async {
//!         serde_json::json!({"status": "ok"})
//!     }).await;
//!
//!     server.start().await?;
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

pub mod logs;
pub mod server;

pub use logs::{LogState, LoggingOptions};
pub use server::{Server, ServerBuilder, ServerInfo};
