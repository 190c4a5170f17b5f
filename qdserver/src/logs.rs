//! Initialisation du système de logging
//!
//! Installs a `tracing_subscriber` registry with a reloadable level filter
//! and an optional console layer, and exposes the current level over HTTP.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use qdconfig::Config;
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};
use tracing::Level;
use tracing_subscriber::{
    Layer, Registry,
    filter::{LevelFilter, filter_fn},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
};

const AVAILABLE_LEVELS: [&str; 5] = ["ERROR", "WARN", "INFO", "DEBUG", "TRACE"];

/// Options d'initialisation du système de logging
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Minimum level, one of ERROR, WARN, INFO, DEBUG, TRACE
    pub min_level: String,
    /// Activer la sortie vers stderr/stdout
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            min_level: "INFO".to_string(),
            enable_console: true,
        }
    }
}

impl LoggingOptions {
    /// Reads `host.logger.*` from the configuration
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            min_level: config.get_log_min_level().unwrap_or(defaults.min_level),
            enable_console: config
                .get_log_enable_console()
                .unwrap_or(defaults.enable_console),
        }
    }
}

/// Handle on the installed subscriber, used to change the level at runtime
#[derive(Clone)]
pub struct LogState {
    max_level: Arc<RwLock<Level>>,
    console: Arc<AtomicBool>,
    reload_handle: reload::Handle<LevelFilter, Registry>,
}

impl LogState {
    fn new(
        level: Level,
        console: bool,
        reload_handle: reload::Handle<LevelFilter, Registry>,
    ) -> Self {
        Self {
            max_level: Arc::new(RwLock::new(level)),
            console: Arc::new(AtomicBool::new(console)),
            reload_handle,
        }
    }

    /// Applies options read after the subscriber was installed
    ///
    /// Lets the entry point start logging with defaults, load the
    /// configuration, then switch to the configured level and console output.
    pub fn apply(&self, options: &LoggingOptions) -> anyhow::Result<()> {
        let level = string_to_level(&options.min_level)
            .ok_or_else(|| anyhow::anyhow!("Invalid log level: {}", options.min_level))?;
        self.set_max_level(level)?;
        self.console.store(options.enable_console, Ordering::Relaxed);
        Ok(())
    }

    pub fn console_enabled(&self) -> bool {
        self.console.load(Ordering::Relaxed)
    }

    /// Changes the active level filter
    pub fn set_max_level(&self, level: Level) -> anyhow::Result<()> {
        self.reload_handle.reload(level_to_levelfilter(level))?;
        if let Ok(mut current) = self.max_level.write() {
            *current = level;
        }
        Ok(())
    }

    pub fn get_max_level(&self) -> Level {
        self.max_level
            .read()
            .map(|level| *level)
            .unwrap_or(Level::INFO)
    }
}

/// Initialise le système de logging
///
/// An unknown level name falls back to INFO. The console layer is always
/// installed and gated by a switch that [`LogState::apply`] can turn off.
/// When a global subscriber is
/// already installed (tests, embedding), the new one is discarded and the
/// returned state only drives the filter it owns.
///
/// # Exemple
/// ```rust,no_run
/// use qdserver::logs::{init_logging, LoggingOptions};
///
/// let log_state = init_logging(LoggingOptions::default());
/// ```
pub fn init_logging(options: LoggingOptions) -> LogState {
    let level = string_to_level(&options.min_level).unwrap_or(Level::INFO);
    let (filter, reload_handle) = reload::Layer::new(level_to_levelfilter(level));
    let log_state = LogState::new(level, options.enable_console, reload_handle);

    let console = log_state.console.clone();
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .with_filter(filter_fn(move |_| console.load(Ordering::Relaxed)));

    // Le filtre doit être appliqué avant la couche console
    let installed = Registry::default()
        .with(filter)
        .with(console_layer)
        .try_init();

    if let Err(e) = installed {
        eprintln!("Logging already initialised: {}", e);
    }

    log_state
}

/// Request body pour le changement de niveau
#[derive(Debug, Deserialize)]
pub struct LogLevelRequest {
    pub level: String,
}

/// Response pour la configuration du logging
#[derive(Debug, Serialize)]
pub struct LogLevelResponse {
    pub current_level: String,
    pub available_levels: Vec<String>,
}

impl LogLevelResponse {
    fn new(level: Level) -> Self {
        Self {
            current_level: level_to_string(level),
            available_levels: AVAILABLE_LEVELS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// GET /log-level
pub async fn log_level_get(State(state): State<LogState>) -> Json<LogLevelResponse> {
    Json(LogLevelResponse::new(state.get_max_level()))
}

/// POST /log-level
pub async fn log_level_post(
    State(state): State<LogState>,
    Json(payload): Json<LogLevelRequest>,
) -> Response {
    let Some(level) = string_to_level(&payload.level) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Invalid log level. Must be one of: ERROR, WARN, INFO, DEBUG, TRACE"
            })),
        )
            .into_response();
    };

    if let Err(e) = state.set_max_level(level) {
        tracing::warn!("Failed to reload log level: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response();
    }

    tracing::info!("Log level changed to: {}", payload.level);
    Json(LogLevelResponse::new(level)).into_response()
}

/// Crée le router pour la gestion du niveau de log
pub fn create_logs_router(log_state: LogState) -> Router {
    Router::new()
        .route("/", get(log_level_get).post(log_level_post))
        .with_state(log_state)
}

fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

fn level_to_string(level: Level) -> String {
    match level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
    .to_string()
}

fn level_to_levelfilter(level: Level) -> LevelFilter {
    match level {
        Level::ERROR => LevelFilter::ERROR,
        Level::WARN => LevelFilter::WARN,
        Level::INFO => LevelFilter::INFO,
        Level::DEBUG => LevelFilter::DEBUG,
        Level::TRACE => LevelFilter::TRACE,
    }
}
