//! Integration tests for the playlists vertical slice
//!
//! Tests playlist operations including:
//! - Creation, listing scope and deletion cascades
//! - The membership state machine (absent <-> present) and its activity log
//! - NotFound handling for unknown playlists


use cadence_core::types::*;
use test_helpers::*;

#[tokio::test]
async fn test_add_and_get_playlist() {
    let test_db = TestDb::new().await;
    let owner = create_test_user(test_db.pool(), "user-1", "alice").await;

    let id = test_db
        .storage
        .playlists()
        .add_playlist("Road trip", &owner)
        .await
        .expect("Failed to create playlist");

    assert!(id.as_str().starts_with("playlist-"));

    let playlist = test_db.storage.playlists().get_playlist(&id).await.unwrap();
    assert_eq!(playlist.name, "Road trip");
    assert_eq!(playlist.owner_id, owner);
    assert_eq!(
        test_db.storage.playlists().get_owner(&id).await.unwrap(),
        Some(owner)
    );
}

#[tokio::test]
async fn test_get_unknown_playlist_is_not_found() {
    let test_db = TestDb::new().await;
    let missing = PlaylistId::new("pl-missing");

    let err = test_db.storage.playlists().get_playlist(&missing).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(test_db.storage.playlists().get_owner(&missing).await.unwrap(), None);
}

#[tokio::test]
async fn test_listing_includes_owned_and_collaborated_playlists() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();

    let alice = create_test_user(pool, "user-1", "alice").await;
    let bob = create_test_user(pool, "user-2", "bob").await;

    create_test_playlist(pool, "pl-a", "Alice A", &alice).await;
    let shared = create_test_playlist(pool, "pl-b", "Alice B", &alice).await;
    create_test_playlist(pool, "pl-c", "Bob C", &bob).await;
    create_test_collaboration(pool, &shared, &bob).await;

    let alice_lists = test_db.storage.playlists().get_playlists_by_user(&alice).await.unwrap();
    assert_eq!(alice_lists.len(), 2);
    assert!(alice_lists.iter().all(|p| p.username.as_deref() == Some("alice")));

    let bob_lists = test_db.storage.playlists().get_playlists_by_user(&bob).await.unwrap();
    let names: Vec<&str> = bob_lists.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(bob_lists.len(), 2);
    assert!(names.contains(&"Alice B"));
    assert!(names.contains(&"Bob C"));
}

#[tokio::test]
async fn test_membership_scenario_add_duplicate_remove() {
    let test_db = TestDb::new().await;
    let (owner, playlist, song) = seed_owner_playlist_song(test_db.pool()).await;
    let playlists = test_db.storage.playlists();

    playlists
        .add_song_to_playlist(&playlist, &song, &owner)
        .await
        .expect("first add succeeds");

    let snapshot = playlists.get_playlist_with_songs(&playlist).await.unwrap();
    assert!(snapshot.contains(&song));

    let log = playlists.get_playlist_activity(&playlist).await.unwrap();
    assert_eq!(log.activities.len(), 1);
    assert_eq!(log.activities[0].action, ActivityAction::Add);

    let err = playlists
        .add_song_to_playlist(&playlist, &song, &owner)
        .await
        .unwrap_err();
    assert!(err.is_invariant());

    // The rejected duplicate leaves no trace in the log or the membership
    let log = playlists.get_playlist_activity(&playlist).await.unwrap();
    assert_eq!(log.activities.len(), 1);

    let snapshot = playlists.get_playlist_with_songs(&playlist).await.unwrap();
    assert_eq!(snapshot.songs.iter().filter(|s| s.id == song).count(), 1);

    playlists
        .remove_song_from_playlist(&playlist, &song, &owner)
        .await
        .expect("remove succeeds");

    let log = playlists.get_playlist_activity(&playlist).await.unwrap();
    assert_eq!(log.activities.len(), 2);
    assert_eq!(log.activities[1].action, ActivityAction::Delete);
    assert_eq!(log.activities[1].username.as_deref(), Some("alice"));
    assert_eq!(log.activities[1].title.as_deref(), Some("Fitzpleasure"));

    let snapshot = playlists.get_playlist_with_songs(&playlist).await.unwrap();
    assert!(!snapshot.contains(&song));
}

#[tokio::test]
async fn test_remove_absent_song_is_not_found() {
    let test_db = TestDb::new().await;
    let (owner, playlist, song) = seed_owner_playlist_song(test_db.pool()).await;

    let err = test_db
        .storage
        .playlists()
        .remove_song_from_playlist(&playlist, &song, &owner)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let log = test_db.storage.playlists().get_playlist_activity(&playlist).await.unwrap();
    assert!(log.activities.is_empty());
}

#[tokio::test]
async fn test_add_unknown_song_is_not_found() {
    let test_db = TestDb::new().await;
    let (owner, playlist, _) = seed_owner_playlist_song(test_db.pool()).await;

    let err = test_db
        .storage
        .playlists()
        .add_song_to_playlist(&playlist, &SongId::new("song-missing"), &owner)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_activity_log_is_chronological() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (owner, playlist, first) = seed_owner_playlist_song(pool).await;
    let second = create_test_song(pool, "song-2", "Blood").await;
    let playlists = test_db.storage.playlists();

    playlists.add_song_to_playlist(&playlist, &first, &owner).await.unwrap();
    playlists.add_song_to_playlist(&playlist, &second, &owner).await.unwrap();
    playlists.remove_song_from_playlist(&playlist, &first, &owner).await.unwrap();

    let log = playlists.get_playlist_activity(&playlist).await.unwrap();
    let entries: Vec<(Option<&str>, ActivityAction)> = log
        .activities
        .iter()
        .map(|a| (a.title.as_deref(), a.action))
        .collect();

    assert_eq!(
        entries,
        vec![
            (Some("Fitzpleasure"), ActivityAction::Add),
            (Some("Blood"), ActivityAction::Add),
            (Some("Fitzpleasure"), ActivityAction::Delete),
        ]
    );
    assert!(log.activities.windows(2).all(|w| w[0].time <= w[1].time));
}

#[tokio::test]
async fn test_snapshot_keeps_insertion_order() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (owner, playlist, first) = seed_owner_playlist_song(pool).await;
    let second = create_test_song(pool, "song-2", "Blood").await;

    let playlists = test_db.storage.playlists();
    playlists.add_song_to_playlist(&playlist, &second, &owner).await.unwrap();
    playlists.add_song_to_playlist(&playlist, &first, &owner).await.unwrap();

    let snapshot = playlists.get_playlist_with_songs(&playlist).await.unwrap();
    let ids: Vec<&SongId> = snapshot.songs.iter().map(|s| &s.id).collect();
    assert_eq!(ids, vec![&second, &first]);
    assert_eq!(snapshot.username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_unknown_playlist_reads_are_not_found() {
    let test_db = TestDb::new().await;
    let missing = PlaylistId::new("pl-missing");

    assert!(test_db
        .storage
        .playlists()
        .get_playlist_with_songs(&missing)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(test_db
        .storage
        .playlists()
        .get_playlist_activity(&missing)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(test_db.cache.is_empty());
}

#[tokio::test]
async fn test_delete_playlist_cascades() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (owner, playlist, song) = seed_owner_playlist_song(pool).await;
    let playlists = test_db.storage.playlists();

    playlists.add_song_to_playlist(&playlist, &song, &owner).await.unwrap();
    playlists.delete_playlist(&playlist).await.unwrap();

    let (memberships,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM playlist_songs WHERE playlist_id = ?")
            .bind(&playlist)
            .fetch_one(pool)
            .await
            .unwrap();
    let (activities,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM playlist_song_activities WHERE playlist_id = ?")
            .bind(&playlist)
            .fetch_one(pool)
            .await
            .unwrap();

    assert_eq!(memberships, 0);
    assert_eq!(activities, 0);
    assert!(playlists.delete_playlist(&playlist).await.unwrap_err().is_not_found());
}
