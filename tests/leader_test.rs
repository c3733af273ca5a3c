//! Leader CRUD, the deactivate soft-delete with meeting unassignment, and
//! account linking.

mod common;

use common::*;
use scoutpost::auth::password;
use scoutpost::models::leader::{self, LinkOutcome};
use scoutpost::models::{meeting, role};

#[tokio::test]
async fn test_create_and_list_leader() {
    let pool = setup_test_db().await;
    seed_leader(&pool, "Dana Frost", "dana@troop.example", &["Group 1", "Group 2"]).await;

    let leaders = leader::find_all(&pool).await.expect("Fetch failed");
    assert_eq!(leaders.len(), 1);
    assert_eq!(leaders[0].name, "Dana Frost");
    assert_eq!(leaders[0].scout_groups, "Group 1,Group 2");
    assert!(leaders[0].active);
    // No linked account means no role
    assert_eq!(leaders[0].role, "");
}

#[tokio::test]
async fn test_deactivate_unassigns_from_every_meeting() {
    let pool = setup_test_db().await;
    let dana = seed_leader(&pool, "Dana Frost", "dana@troop.example", &["Group 1"]).await;
    let eli = seed_leader(&pool, "Eli Marsh", "eli@troop.example", &["Group 2"]).await;
    let m1 = seed_meeting(&pool, "2030-03-04", &["Group 1"], &[dana, eli]).await;
    let m2 = seed_meeting(&pool, "2030-03-11", &["Group 1"], &[dana]).await;

    leader::deactivate(&pool, dana).await.expect("Deactivate failed");

    // The record survives but is inactive
    let dana_row = leader::find_by_id(&pool, dana)
        .await
        .expect("Lookup failed")
        .expect("Leader should still exist");
    assert!(!dana_row.active);
    assert!(leader::find_active(&pool).await.expect("Fetch failed").iter().all(|l| l.id != dana));

    // Removed from both meetings; the other leader keeps their assignment
    let m1_leaders = meeting::find_assigned_leader_ids(&pool, m1).await.expect("Fetch failed");
    assert_eq!(m1_leaders, vec![eli]);
    let m2_leaders = meeting::find_assigned_leader_ids(&pool, m2).await.expect("Fetch failed");
    assert!(m2_leaders.is_empty());
}

#[tokio::test]
async fn test_link_account_assigns_role() {
    let pool = setup_test_db().await;
    let dana = seed_leader(&pool, "Dana Frost", "dana@troop.example", &["Group 1"]).await;
    let hash = password::hash_password(ADMIN_PASS).expect("Failed to hash password");
    let user_id = seed_user(&pool, "dana@troop.example", &hash).await;

    let outcome = leader::link_account(&pool, dana, user_id, "Admin Leader")
        .await
        .expect("Link failed");
    assert!(matches!(outcome, LinkOutcome::Linked));

    let dana_row = leader::find_by_id(&pool, dana)
        .await
        .expect("Lookup failed")
        .expect("Leader should exist");
    assert_eq!(dana_row.user_id, Some(user_id));
    assert_eq!(
        role::find_by_user_id(&pool, user_id).await.expect("Role lookup failed"),
        Some("Admin Leader".to_string())
    );
}

#[tokio::test]
async fn test_link_account_keeps_link_when_role_write_fails() {
    let pool = setup_test_db().await;
    let dana = seed_leader(&pool, "Dana Frost", "dana@troop.example", &["Group 1"]).await;
    let hash = password::hash_password(ADMIN_PASS).expect("Failed to hash password");
    let user_id = seed_user(&pool, "dana@troop.example", &hash).await;

    // The roles table has a CHECK on the role name, so an unknown role fails
    // the second step after the link itself succeeded.
    let outcome = leader::link_account(&pool, dana, user_id, "Quartermaster")
        .await
        .expect("Link call should not error");
    assert!(matches!(outcome, LinkOutcome::LinkedRoleFailed(_)));

    let dana_row = leader::find_by_id(&pool, dana)
        .await
        .expect("Lookup failed")
        .expect("Leader should exist");
    assert_eq!(dana_row.user_id, Some(user_id));
    assert_eq!(role::find_by_user_id(&pool, user_id).await.expect("Role lookup failed"), None);
}
