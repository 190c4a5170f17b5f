mod common;

use common::{PLAYLIST_NAME, TOKEN};
use mockito::{Matcher, Server, ServerGuard};
use qdspotify::{
    CollectionMember, CollectionName, MemoryCollectionStore, PlaylistMethod, QuickDiscoverClient,
    SpotifyApi, SpotifyError, StalenessPolicy, UpstreamClient, UpstreamErrorObject,
};
use serde_json::json;
use std::sync::Arc;

const BEARER: &str = "Bearer test-token";

/// Matches a path whether or not the query string is part of it
fn path(p: &str) -> Matcher {
    Matcher::Regex(format!(r"^{}(\?.*)?$", p))
}

fn api(server: &ServerGuard) -> SpotifyApi {
    SpotifyApi::with_base_url(server.url()).unwrap()
}

fn client(server: &ServerGuard) -> QuickDiscoverClient {
    QuickDiscoverClient::new(
        Arc::new(api(server)),
        Arc::new(MemoryCollectionStore::new()),
        StalenessPolicy::default(),
        PLAYLIST_NAME,
    )
}

fn item(uri: &str) -> serde_json::Value {
    json!({"track": common::raw_track(uri)})
}

#[tokio::test]
async fn test_categories_are_read_from_browse_endpoint() {
    common::init_tracing();
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", path("/browse/categories"))
        .match_header("authorization", BEARER)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("country".into(), "US".into()),
            Matcher::UrlEncoded("locale".into(), "us_EN".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"categories": {"items": [
                {"id": "toplists", "name": "Top Lists", "href": "x", "icons": []},
                {"id": "hiphop", "name": "Hip-Hop"}
            ], "total": 2}})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let client = client(&server);
    let first = client.load_categories(TOKEN).await.unwrap();
    assert_eq!(
        first,
        vec![
            CollectionMember::new("toplists", "Top Lists"),
            CollectionMember::new("hiphop", "Hip-Hop"),
        ]
    );

    // Second load is served from the store
    let second = client.load_categories(TOKEN).await.unwrap();
    assert_eq!(second, first);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_genre_seeds_become_members() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/recommendations/available-genre-seeds"))
        .with_status(200)
        .with_body(json!({"genres": ["acoustic", "afrobeat"]}).to_string())
        .create_async()
        .await;

    let genres = api(&server)
        .fetch_collection(TOKEN, CollectionName::Genres)
        .await
        .unwrap();
    assert_eq!(
        genres,
        vec![
            CollectionMember::new("acoustic", "acoustic"),
            CollectionMember::new("afrobeat", "afrobeat"),
        ]
    );
}

#[tokio::test]
async fn test_expired_token_is_passed_through() {
    let mut server = Server::new_async().await;
    let body = json!({"error": {"status": 401, "message": "The access token expired"}});
    server
        .mock("GET", path("/browse/categories"))
        .with_status(401)
        .with_body(body.to_string())
        .create_async()
        .await;
    server
        .mock("GET", path("/search"))
        .with_status(401)
        .with_body(body.to_string())
        .create_async()
        .await;

    let client = client(&server);
    let err = client.load_categories(TOKEN).await.unwrap_err();
    assert_eq!(
        err.error_object(),
        Some(&UpstreamErrorObject::new(401, "The access token expired"))
    );

    let err = client.get_genre_tracks(TOKEN, "rock").await.unwrap_err();
    assert_eq!(serde_json::to_value(err.to_error_object()).unwrap(), body);
}

#[tokio::test]
async fn test_non_json_error_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/me"))
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let err = api(&server)
        .resolve_current_user_id(TOKEN)
        .await
        .unwrap_err();
    assert_eq!(
        err.error_object(),
        Some(&UpstreamErrorObject::new(503, "upstream unavailable"))
    );
}

#[tokio::test]
async fn test_missing_wrapper_is_a_hard_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/search"))
        .with_status(200)
        .with_body(json!({"albums": {"items": []}}).to_string())
        .create_async()
        .await;

    let err = api(&server)
        .search_tracks_by_genre(TOKEN, "rock")
        .await
        .unwrap_err();
    assert!(matches!(err, SpotifyError::JsonParse(_)));
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn test_category_playlist_end_to_end() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/browse/categories/hiphop/playlists"))
        .match_query(Matcher::UrlEncoded("limit".into(), "5".into()))
        .with_status(200)
        .with_body(
            json!({"playlists": {"items": [
                {"id": "pl1", "name": "RapCaviar"},
                null,
                {"id": "pl2", "name": "Most Necessary"}
            ]}})
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", path("/playlists/pl1"))
        .match_query(Matcher::UrlEncoded("fields".into(), "tracks".into()))
        .with_status(200)
        .with_body(
            json!({"tracks": {"items": [item("spotify:track:a"), {"track": null}]}}).to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", path("/playlists/pl2"))
        .with_status(200)
        .with_body(json!({"tracks": {"items": [item("spotify:track:b")]}}).to_string())
        .create_async()
        .await;

    let result = client(&server)
        .get_category_playlist(TOKEN, "hiphop")
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value[0]["playlistName"], "RapCaviar");
    assert_eq!(value[0]["playlistTracks"][0]["trackURI"], "spotify:track:a");
    assert_eq!(value[0]["playlistTracks"][1]["trackURI"], "");
    assert_eq!(value[1]["playlistName"], "Most Necessary");
    assert_eq!(value[1]["playlistTracks"][0]["trackAlbumImage"], "http://img/1");
}

#[tokio::test]
async fn test_add_posts_uris_at_top_of_playlist() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", path("/playlists/pl1/tracks"))
        .match_header("authorization", BEARER)
        .match_query(Matcher::UrlEncoded("position".into(), "0".into()))
        .match_body(Matcher::Json(json!({"uris": ["spotify:track:a", "spotify:track:b"]})))
        .with_status(201)
        .with_body(json!({"snapshot_id": "snap-add"}).to_string())
        .create_async()
        .await;

    let snapshot = api(&server)
        .mutate_playlist_track(
            TOKEN,
            "pl1",
            "spotify:track:a, spotify:track:b",
            PlaylistMethod::Add,
        )
        .await
        .unwrap();
    assert_eq!(snapshot, "snap-add");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_remove_sends_track_objects() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", path("/playlists/pl1/tracks"))
        .match_body(Matcher::Json(json!({"tracks": [{"uri": "spotify:track:a"}]})))
        .with_status(200)
        .with_body(json!({"snapshot_id": "snap-rm"}).to_string())
        .create_async()
        .await;

    let snapshot = api(&server)
        .mutate_playlist_track(TOKEN, "pl1", "spotify:track:a", PlaylistMethod::Remove)
        .await
        .unwrap();
    assert_eq!(snapshot, "snap-rm");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_playlist_is_created_private() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", path("/users/user-1/playlists"))
        .with_status(200)
        .with_body(json!({"items": [{"id": "x", "name": "Road trip"}]}).to_string())
        .create_async()
        .await;
    let create = server
        .mock("POST", path("/users/user-1/playlists"))
        .match_body(Matcher::Json(json!({
            "name": PLAYLIST_NAME,
            "description": "Songs discovered through the Quick Discover web app",
            "public": false
        })))
        .with_status(201)
        .with_body(json!({"id": "new-pl", "name": PLAYLIST_NAME, "public": false}).to_string())
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", path("/playlists/new-pl"))
        .with_status(200)
        .with_body(json!({"tracks": {"items": []}}).to_string())
        .create_async()
        .await;

    let tracks = client(&server)
        .get_user_playlist_tracks(TOKEN, "user-1")
        .await
        .unwrap();
    assert!(tracks.is_empty());
    create.assert_async().await;
}
