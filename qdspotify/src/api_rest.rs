//! Endpoints API REST de Quick Discover
//!
//! Ce module définit les handlers HTTP exposés au client web. Le jeton
//! Spotify arrive dans l'en-tête `access_token`; les routes `/playlist`
//! exigent en plus un utilisateur, résolu par le middleware [`require_user`].
//!
//! Successful answers are wrapped as `{"data": ...}`. Spotify error objects
//! are answered verbatim with their own status.

use crate::client::QuickDiscoverClient;
use crate::error::{SpotifyError, UpstreamErrorObject};
use crate::models::{CollectionMember, PlaylistNameAndTracks, TrackData};
use axum::{
    Extension, Json, Router,
    extract::{FromRequestParts, Path, Query, Request, State},
    http::{StatusCode, request::Parts},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// En-tête portant le jeton d'accès Spotify
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// En-tête optionnel portant l'identifiant utilisateur déjà validé
pub const USER_ID_HEADER: &str = "user_id";

/// État partagé de l'application
#[derive(Clone)]
pub struct SpotifyState {
    pub client: Arc<QuickDiscoverClient>,
}

/// Identifiant de l'utilisateur, attaché par [`require_user`]
#[derive(Debug, Clone)]
pub struct UserId(pub String);

/// Jeton extrait de l'en-tête `access_token`
#[derive(Debug, Clone)]
pub struct AccessToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for AccessToken {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| AccessToken(token.to_string()))
            .ok_or_else(|| AppError(SpotifyError::upstream(401, "No token provided")))
    }
}

/// Paramètres des routes de mutation
#[derive(Debug, Deserialize)]
pub struct TrackParams {
    /// Une ou plusieurs URIs séparées par des virgules
    pub track_uri: String,
}

/// Enveloppe des réponses réussies
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct SnapshotData {
    pub snapshot_id: String,
}

fn data<T>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}

/// Crée le router Axum avec tous les endpoints Quick Discover
pub fn create_router(state: SpotifyState) -> Router {
    let playlist = Router::new()
        .route("/", get(get_user_playlist))
        .route("/add", put(add_track))
        .route("/remove", delete(remove_track))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        // Catégories
        .route("/categories", get(get_categories))
        .route("/categories/{category_id}", get(get_category))
        // Genres
        .route("/genres", get(get_genres))
        .route("/genres/{genre_id}", get(get_genre))
        // Playlist utilisateur
        .nest("/playlist", playlist)
        .with_state(state)
}

/// Resolves the caller and attaches a [`UserId`] extension
///
/// A `user_id` header set by an upstream gateway is trusted as-is;
/// otherwise the id is looked up from the token.
pub async fn require_user(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let forwarded = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    let user_id = match forwarded {
        Some(id) => id,
        None => state.client.current_user_id(&token).await?,
    };
    debug!("Request authorised for user {}", user_id);

    request.extensions_mut().insert(UserId(user_id));
    Ok(next.run(request).await)
}

// ============ Handlers ============

async fn get_categories(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
) -> Result<Json<DataResponse<Vec<CollectionMember>>>, AppError> {
    let categories = state.client.load_categories(&token).await?;
    Ok(data(categories))
}

async fn get_category(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    Path(category_id): Path<String>,
) -> Result<Response, AppError> {
    let playlists: Vec<PlaylistNameAndTracks> = state
        .client
        .get_category_playlist(&token, &category_id)
        .await?;

    if playlists.is_empty() {
        let body = UpstreamErrorObject::new(501, "Error retrieving requested category data");
        return Ok((StatusCode::NOT_IMPLEMENTED, Json(body)).into_response());
    }

    Ok(data(playlists).into_response())
}

async fn get_genres(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
) -> Result<Json<DataResponse<Vec<CollectionMember>>>, AppError> {
    let genres = state.client.load_genres(&token).await?;
    Ok(data(genres))
}

async fn get_genre(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    Path(genre_id): Path<String>,
) -> Result<Json<DataResponse<Vec<TrackData>>>, AppError> {
    let tracks = state.client.get_genre_tracks(&token, &genre_id).await?;
    Ok(data(tracks))
}

async fn get_user_playlist(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    Extension(UserId(user_id)): Extension<UserId>,
) -> Result<Json<DataResponse<Vec<TrackData>>>, AppError> {
    let tracks = state
        .client
        .get_user_playlist_tracks(&token, &user_id)
        .await?;
    Ok(data(tracks))
}

async fn add_track(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(params): Query<TrackParams>,
) -> Result<Json<DataResponse<SnapshotData>>, AppError> {
    let snapshot_id = state
        .client
        .add_to_playlist(&token, &user_id, &params.track_uri)
        .await?;
    Ok(data(SnapshotData { snapshot_id }))
}

async fn remove_track(
    State(state): State<SpotifyState>,
    AccessToken(token): AccessToken,
    Extension(UserId(user_id)): Extension<UserId>,
    Query(params): Query<TrackParams>,
) -> Result<Json<DataResponse<SnapshotData>>, AppError> {
    let snapshot_id = state
        .client
        .remove_from_playlist(&token, &user_id, &params.track_uri)
        .await?;
    Ok(data(SnapshotData { snapshot_id }))
}

// ============ Gestion des erreurs ============

/// Conversion des erreurs du client en réponse HTTP
pub struct AppError(pub SpotifyError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if !self.0.is_error_value() {
            error!("Request failed: {}", self.0);
        }

        let body = self.0.to_error_object();
        let status =
            StatusCode::from_u16(body.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<SpotifyError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
