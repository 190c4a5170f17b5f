//! Gestion des erreurs pour le client Spotify
//!
//! Upstream failures are not collapsed into an HTTP-status enum: Spotify's
//! `{"error": {"status", "message"}}` object is kept as-is so the REST layer
//! can forward it verbatim to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Type Result personnalisé pour qdspotify
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Status used when a track is already present in the designated playlist
pub const CONFLICT_STATUS: u16 = 423;

/// Message paired with [`CONFLICT_STATUS`]
pub const TRACK_EXISTS_MESSAGE: &str = "Track already exists in playlist";

/// Body of the Spotify error object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

/// `{"error": {"status": .., "message": ..}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamErrorObject {
    pub error: ErrorBody,
}

impl UpstreamErrorObject {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                status,
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> u16 {
        self.error.status
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    /// Décode le corps d'une réponse non-2xx
    ///
    /// A body that is not a Spotify error object still yields one, carrying
    /// the HTTP status and the raw text (or the canonical reason when empty).
    pub fn from_response_body(status: u16, body: &str) -> Self {
        if let Ok(object) = serde_json::from_str::<UpstreamErrorObject>(body) {
            return object;
        }

        let message = match body.trim() {
            "" => reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("Unknown error")
                .to_string(),
            text => text.to_string(),
        };
        Self::new(status, message)
    }
}

impl fmt::Display for UpstreamErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.error.status, self.error.message)
    }
}

/// Erreurs possibles lors de l'utilisation du client Spotify
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Erreur renvoyée par l'API Spotify, transmise telle quelle
    #[error("Spotify API error ({0})")]
    Upstream(UpstreamErrorObject),

    /// Mutation refusée localement (piste déjà présente)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Aucun document ne correspond à la requête
    #[error("No results match the query")]
    NoResults,

    /// Erreur HTTP (réseau, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Réponse Spotify sans la structure attendue
    #[error("Malformed upstream payload: {0}")]
    Format(String),

    /// Erreur du stockage des collections
    #[error("Store error: {0}")]
    Store(String),

    /// Erreur SQLite
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}

impl SpotifyError {
    /// Crée une erreur upstream depuis un statut et un message
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream(UpstreamErrorObject::new(status, message))
    }

    /// The 423 returned when every candidate URI is already in the playlist
    pub fn track_already_exists() -> Self {
        Self::Conflict(TRACK_EXISTS_MESSAGE.to_string())
    }

    /// Retourne l'objet d'erreur Spotify si l'erreur vient de l'amont
    pub fn error_object(&self) -> Option<&UpstreamErrorObject> {
        match self {
            Self::Upstream(object) => Some(object),
            _ => None,
        }
    }

    /// Vérifie si l'erreur est une valeur d'erreur (et non une panne)
    ///
    /// Upstream objects and local conflicts travel back to the caller;
    /// everything else is a hard failure.
    pub fn is_error_value(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Conflict(_))
    }

    /// HTTP status associated with this error
    pub fn status(&self) -> u16 {
        match self {
            Self::Upstream(object) => object.status(),
            Self::Conflict(_) => CONFLICT_STATUS,
            Self::NoResults => 404,
            _ => 500,
        }
    }

    /// Error object to send back to an HTTP caller
    ///
    /// Hard failures never leak their details.
    pub fn to_error_object(&self) -> UpstreamErrorObject {
        match self {
            Self::Upstream(object) => object.clone(),
            Self::Conflict(message) => UpstreamErrorObject::new(CONFLICT_STATUS, message.clone()),
            Self::NoResults => UpstreamErrorObject::new(404, "No results match the query"),
            _ => UpstreamErrorObject::new(500, "Internal server error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_spotify_error_body() {
        let body = r#"{"error":{"status":401,"message":"Invalid access token"}}"#;
        let object = UpstreamErrorObject::from_response_body(401, body);
        assert_eq!(object.status(), 401);
        assert_eq!(object.message(), "Invalid access token");
    }

    #[test]
    fn test_decode_non_json_body_keeps_text() {
        let object = UpstreamErrorObject::from_response_body(502, "Bad gateway from proxy");
        assert_eq!(object, UpstreamErrorObject::new(502, "Bad gateway from proxy"));

        let object = UpstreamErrorObject::from_response_body(404, "  ");
        assert_eq!(object.message(), "Not Found");
    }

    #[test]
    fn test_conflict_object() {
        let err = SpotifyError::track_already_exists();
        assert!(err.is_error_value());
        assert_eq!(err.status(), 423);
        assert_eq!(
            serde_json::to_value(err.to_error_object()).unwrap(),
            serde_json::json!({"error": {"status": 423, "message": "Track already exists in playlist"}})
        );
    }

    #[test]
    fn test_hard_failure_is_masked() {
        let err = SpotifyError::Store("disk full".into());
        assert!(!err.is_error_value());
        assert!(err.error_object().is_none());
        let object = err.to_error_object();
        assert_eq!(object.status(), 500);
        assert_eq!(object.message(), "Internal server error");
    }
}
