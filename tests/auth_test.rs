//! Authentication tests — password hashing, the invite allowlist gate, roles,
//! and the role cache.

mod common;

use common::*;
use scoutpost::auth::allowlist::Allowlist;
use scoutpost::auth::password;
use scoutpost::auth::role_cache::RoleCache;
use scoutpost::models::{invited_user, role, user};

const TEST_PASSWORD: &str = "password123";

#[test]
fn test_hash_password_success() {
    let hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    assert!(!hash.is_empty());
    assert!(hash.len() > 20);
}

#[test]
fn test_verify_password_correct_and_incorrect() {
    let hash = password::hash_password(TEST_PASSWORD).expect("Failed to hash password");
    assert!(password::verify_password(TEST_PASSWORD, &hash).expect("Verification failed"));
    assert!(!password::verify_password("wrongpassword", &hash).expect("Verification failed"));
}

#[test]
fn test_hash_password_randomness() {
    let hash1 = password::hash_password(TEST_PASSWORD).expect("Failed to hash first password");
    let hash2 = password::hash_password(TEST_PASSWORD).expect("Failed to hash second password");
    // Same password, different salts
    assert_ne!(hash1, hash2);
}

#[tokio::test]
async fn test_db_allowlist_gates_on_membership() {
    let pool = setup_test_db().await;
    invited_user::add(&pool, "kim@troop.example")
        .await
        .expect("Failed to add invite");

    let allowlist = Allowlist::Db;
    assert!(allowlist.is_invited(&pool, "kim@troop.example").await);
    // Normalization: case and whitespace must not matter
    assert!(allowlist.is_invited(&pool, "  KIM@Troop.Example ").await);
    assert!(!allowlist.is_invited(&pool, "stranger@troop.example").await);
}

#[tokio::test]
async fn test_valid_credentials_without_invite_are_still_rejected() {
    let pool = setup_test_db().await;
    let hash = password::hash_password(ADMIN_PASS).expect("Failed to hash password");
    seed_user(&pool, ADMIN_EMAIL, &hash).await;

    // The account exists and the password would verify, but the allowlist
    // check comes first and the email was never invited.
    let allowlist = Allowlist::Db;
    assert!(!allowlist.is_invited(&pool, ADMIN_EMAIL).await);

    let found = user::find_by_email(&pool, ADMIN_EMAIL)
        .await
        .expect("Lookup failed")
        .expect("User should exist");
    assert!(password::verify_password(ADMIN_PASS, &found.password).expect("Verification failed"));
}

#[tokio::test]
async fn test_duplicate_invite_rejected_case_insensitively() {
    let pool = setup_test_db().await;
    invited_user::add(&pool, "kim@troop.example")
        .await
        .expect("Failed to add invite");
    let duplicate = invited_user::add(&pool, "KIM@TROOP.EXAMPLE").await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_role_cache_resolves_and_invalidates() {
    let pool = setup_test_db().await;
    let hash = password::hash_password(ADMIN_PASS).expect("Failed to hash password");
    let user_id = seed_user(&pool, ADMIN_EMAIL, &hash).await;

    let cache = RoleCache::new();
    // No role assigned yet
    assert_eq!(cache.resolve(&pool, user_id).await, None);

    role::assign(&pool, user_id, "Admin")
        .await
        .expect("Failed to assign role");
    // None was memoized at first resolve; invalidate to pick up the new role
    cache.invalidate(user_id).await;
    assert_eq!(cache.resolve(&pool, user_id).await, Some("Admin".to_string()));

    // Role replacement follows the same path
    role::assign(&pool, user_id, "Leader")
        .await
        .expect("Failed to reassign role");
    assert_eq!(cache.resolve(&pool, user_id).await, Some("Admin".to_string()));
    cache.invalidate(user_id).await;
    assert_eq!(cache.resolve(&pool, user_id).await, Some("Leader".to_string()));
}
