//! Integration tests for playlist authorization
//!
//! The owner check runs against a real database; the collaborator seam is
//! mocked to pin down when it is consulted and how its failures surface.


use async_trait::async_trait;
use cadence_core::types::*;
use cadence_core::{CadenceError, CollaborationResolver, FORBIDDEN_MESSAGE};
use cadence_storage::access::{AccessGrant, PlaylistAccess};
use mockall::mock;
use std::sync::Arc;
use test_helpers::*;

mock! {
    pub Collaborations {}

    #[async_trait]
    impl CollaborationResolver for Collaborations {
        async fn verify_collaborator(
            &self,
            playlist_id: &PlaylistId,
            user_id: &UserId,
        ) -> cadence_core::Result<()>;
    }
}

fn access_with(test_db: &TestDb, collaborations: MockCollaborations) -> PlaylistAccess {
    PlaylistAccess::new(test_db.storage.playlists().clone(), Arc::new(collaborations))
}

#[tokio::test]
async fn test_owner_is_granted_without_collaborator_lookup() {
    let test_db = TestDb::new().await;
    let (owner, playlist, _) = seed_owner_playlist_song(test_db.pool()).await;

    let mut collaborations = MockCollaborations::new();
    collaborations.expect_verify_collaborator().times(0);

    let grant = access_with(&test_db, collaborations)
        .verify_access(&playlist, &owner)
        .await
        .unwrap();
    assert_eq!(grant, AccessGrant::Owner);
}

#[tokio::test]
async fn test_missing_playlist_is_not_found_without_collaborator_lookup() {
    let test_db = TestDb::new().await;
    create_test_user(test_db.pool(), "user-1", "alice").await;

    let mut collaborations = MockCollaborations::new();
    collaborations.expect_verify_collaborator().times(0);

    let err = access_with(&test_db, collaborations)
        .verify_access(&PlaylistId::new("pl-missing"), &UserId::new("user-1"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_collaborator_is_granted() {
    let test_db = TestDb::new().await;
    let (_, playlist, _) = seed_owner_playlist_song(test_db.pool()).await;
    let bob = create_test_user(test_db.pool(), "user-2", "bob").await;

    let mut collaborations = MockCollaborations::new();
    collaborations
        .expect_verify_collaborator()
        .times(1)
        .returning(|_, _| Ok(()));

    let grant = access_with(&test_db, collaborations)
        .verify_access(&playlist, &bob)
        .await
        .unwrap();
    assert_eq!(grant, AccessGrant::Collaborator);
}

#[tokio::test]
async fn test_failed_collaborator_lookup_surfaces_ownership_error() {
    let test_db = TestDb::new().await;
    let (_, playlist, _) = seed_owner_playlist_song(test_db.pool()).await;
    let mallory = create_test_user(test_db.pool(), "user-3", "mallory").await;

    let mut collaborations = MockCollaborations::new();
    collaborations
        .expect_verify_collaborator()
        .times(1)
        .returning(|_, _| Err(CadenceError::Database("connection reset".into())));

    let err = access_with(&test_db, collaborations)
        .verify_access(&playlist, &mallory)
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    assert_eq!(err.to_string(), FORBIDDEN_MESSAGE);
}

#[tokio::test]
async fn test_real_resolver_grants_and_denies() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (owner, playlist, _) = seed_owner_playlist_song(pool).await;
    let bob = create_test_user(pool, "user-2", "bob").await;
    let mallory = create_test_user(pool, "user-3", "mallory").await;
    create_test_collaboration(pool, &playlist, &bob).await;

    let access = test_db.storage.access();

    assert_eq!(access.verify_access(&playlist, &owner).await.unwrap(), AccessGrant::Owner);
    assert_eq!(
        access.verify_access(&playlist, &bob).await.unwrap(),
        AccessGrant::Collaborator
    );

    let err = access.verify_access(&playlist, &mallory).await.unwrap_err();
    assert!(err.is_forbidden());
    assert_eq!(err.to_string(), FORBIDDEN_MESSAGE);
}

#[tokio::test]
async fn test_verify_owner_rejects_collaborators() {
    let test_db = TestDb::new().await;
    let pool = test_db.pool();
    let (owner, playlist, _) = seed_owner_playlist_song(pool).await;
    let bob = create_test_user(pool, "user-2", "bob").await;
    create_test_collaboration(pool, &playlist, &bob).await;

    let access = test_db.storage.access();

    access.verify_owner(&playlist, &owner).await.unwrap();
    assert!(access.verify_owner(&playlist, &bob).await.unwrap_err().is_forbidden());
    assert!(access
        .verify_owner(&PlaylistId::new("pl-missing"), &owner)
        .await
        .unwrap_err()
        .is_not_found());
}
