mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use qdspotify::{
    CollectionMember, CollectionName, CollectionStore, CollectionSyncEngine,
    MemoryCollectionStore, SpotifyError, SqliteCollectionStore, StalenessPolicy,
    UpstreamErrorObject,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const GENRES: CollectionName = CollectionName::Genres;

struct Backend {
    label: &'static str,
    store: Arc<dyn CollectionStore>,
    _dir: Option<TempDir>,
}

fn backends() -> Vec<Backend> {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = SqliteCollectionStore::open(dir.path().join("collections.db")).unwrap();
    vec![
        Backend {
            label: "memory",
            store: Arc::new(MemoryCollectionStore::new()),
            _dir: None,
        },
        Backend {
            label: "sqlite",
            store: Arc::new(sqlite),
            _dir: Some(dir),
        },
    ]
}

fn t0() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
}

fn members(ids: &[&str]) -> Vec<CollectionMember> {
    ids.iter().map(|id| CollectionMember::new(*id, *id)).collect()
}

/// Loads at `now`, fetching `fresh` and counting fetches
async fn load(
    engine: &CollectionSyncEngine,
    now: DateTime<Utc>,
    fresh: qdspotify::Result<Vec<CollectionMember>>,
    fetches: &AtomicUsize,
) -> qdspotify::Result<Vec<CollectionMember>> {
    engine
        .load_at(GENRES, now, || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            fresh
        })
        .await
}

async fn seed(engine: &CollectionSyncEngine, ids: &[&str]) {
    let fetches = AtomicUsize::new(0);
    load(engine, t0(), Ok(members(ids)), &fetches).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fresh_snapshot_is_served_without_fetching() {
    common::init_tracing();
    for backend in backends() {
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());
        seed(&engine, &["rock", "jazz"]).await;

        let fetches = AtomicUsize::new(0);
        for offset in [Duration::zero(), Duration::minutes(30), Duration::hours(1)] {
            let loaded = load(&engine, t0() + offset, Ok(members(&["pop"])), &fetches)
                .await
                .unwrap();
            assert_eq!(loaded, members(&["rock", "jazz"]), "{}", backend.label);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 0, "{}", backend.label);
    }
}

#[tokio::test]
async fn test_stale_snapshot_is_fully_replaced() {
    for backend in backends() {
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());
        seed(&engine, &["rock", "jazz", "blues"]).await;

        let later = t0() + Duration::hours(1) + Duration::milliseconds(1);
        let fetches = AtomicUsize::new(0);
        let loaded = load(&engine, later, Ok(members(&["pop"])), &fetches)
            .await
            .unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1, "{}", backend.label);
        assert_eq!(loaded, members(&["pop"]));
        assert_eq!(
            backend.store.read_collection("genres").await.unwrap(),
            members(&["pop"]),
            "{}",
            backend.label
        );
        let record = backend.store.read_staleness("genres").await.unwrap().unwrap();
        assert_eq!(record.last_updated, later);
    }
}

#[tokio::test]
async fn test_failed_refresh_keeps_snapshot_and_timestamp() {
    for backend in backends() {
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());
        seed(&engine, &["rock"]).await;

        let expired = UpstreamErrorObject::new(401, "The access token expired");
        let later = t0() + Duration::hours(2);
        let fetches = AtomicUsize::new(0);
        let err = load(
            &engine,
            later,
            Err(SpotifyError::Upstream(expired.clone())),
            &fetches,
        )
        .await
        .unwrap_err();

        assert_eq!(err.error_object(), Some(&expired), "{}", backend.label);
        assert_eq!(
            backend.store.read_collection("genres").await.unwrap(),
            members(&["rock"])
        );
        let record = backend.store.read_staleness("genres").await.unwrap().unwrap();
        assert_eq!(record.last_updated, t0(), "{}", backend.label);

        // Hard failures leave the store alone as well
        let err = load(
            &engine,
            later,
            Err(SpotifyError::Format("missing genres".into())),
            &fetches,
        )
        .await
        .unwrap_err();
        assert!(!err.is_error_value());
        assert_eq!(backend.store.read_collection("genres").await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_empty_collection_is_always_refetched() {
    for backend in backends() {
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());
        let fetches = AtomicUsize::new(0);

        // A fresh timestamp does not protect an empty snapshot
        backend.store.write_staleness("genres", t0()).await.unwrap();
        let loaded = load(&engine, t0(), Ok(Vec::new()), &fetches).await.unwrap();
        assert!(loaded.is_empty());

        let loaded = load(&engine, t0(), Ok(members(&["soul"])), &fetches)
            .await
            .unwrap();
        assert_eq!(loaded, members(&["soul"]));
        assert_eq!(fetches.load(Ordering::SeqCst), 2, "{}", backend.label);
    }
}

#[tokio::test]
async fn test_missing_timestamp_forces_refresh() {
    for backend in backends() {
        backend
            .store
            .replace_collection("genres", &members(&["old"]))
            .await
            .unwrap();
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());

        let fetches = AtomicUsize::new(0);
        let loaded = load(&engine, t0(), Ok(members(&["new"])), &fetches)
            .await
            .unwrap();
        assert_eq!(loaded, members(&["new"]), "{}", backend.label);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert!(backend.store.read_staleness("genres").await.unwrap().is_some());
    }
}

#[tokio::test]
async fn test_collections_are_tracked_independently() {
    for backend in backends() {
        let engine = CollectionSyncEngine::new(backend.store.clone(), StalenessPolicy::default());
        seed(&engine, &["rock"]).await;

        let fetches = AtomicUsize::new(0);
        let categories = engine
            .load_at(CollectionName::Categories, t0(), || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(vec![CollectionMember::new("toplists", "Top Lists")])
            })
            .await
            .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1, "{}", backend.label);
        assert_eq!(backend.store.read_collection("genres").await.unwrap().len(), 1);
    }
}

#[tokio::test]
async fn test_short_ttl() {
    let store: Arc<dyn CollectionStore> = Arc::new(MemoryCollectionStore::new());
    let engine = CollectionSyncEngine::new(
        store,
        StalenessPolicy::new(std::time::Duration::from_secs(10)),
    );
    seed(&engine, &["rock"]).await;

    let fetches = AtomicUsize::new(0);
    load(&engine, t0() + Duration::seconds(10), Ok(members(&["x"])), &fetches)
        .await
        .unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 0);
    load(&engine, t0() + Duration::seconds(11), Ok(members(&["x"])), &fetches)
        .await
        .unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_store_write_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collections.db");
    let store: Arc<dyn CollectionStore> = Arc::new(SqliteCollectionStore::open(&path).unwrap());
    let engine = CollectionSyncEngine::new(store.clone(), StalenessPolicy::default());
    seed(&engine, &["rock"]).await;

    // Refresh timestamps can no longer be updated
    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER freeze_updates BEFORE UPDATE ON documents
             WHEN OLD.collection = 'collectionsUpdates'
             BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
        )
        .unwrap();

    let fetches = AtomicUsize::new(0);
    let err = load(
        &engine,
        t0() + Duration::hours(2),
        Ok(members(&["pop", "jazz"])),
        &fetches,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, SpotifyError::Sqlite(_)));
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert_eq!(store.read_collection("genres").await.unwrap(), members(&["rock"]));
    let record = store.read_staleness("genres").await.unwrap().unwrap();
    assert_eq!(record.last_updated, t0());
}
