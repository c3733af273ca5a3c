//! Scout CRUD and list-screen behavior: search, group sections, and the
//! clamped points-total adjustment.

mod common;

use common::*;
use scoutpost::models::scout::{self, NewScout, filter_scouts, group_by_scout_group};

#[tokio::test]
async fn test_create_and_find_scout() {
    let pool = setup_test_db().await;
    let id = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;

    let scout = scout::find_by_id(&pool, id)
        .await
        .expect("Lookup failed")
        .expect("Scout should exist");
    assert_eq!(scout.name, "Robin Park");
    assert_eq!(scout.scout_group, "Group 1");
    assert_eq!(scout.points_total, 0);
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let pool = setup_test_db().await;
    seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;

    let duplicate = scout::create(
        &pool,
        &NewScout {
            name: "Other Robin".to_string(),
            email: "ROBIN@troop.example".to_string(),
            scout_group: "Group 2".to_string(),
            notes: String::new(),
            parent_contact: String::new(),
        },
    )
    .await;
    assert!(duplicate.is_err());
}

#[tokio::test]
async fn test_update_scout() {
    let pool = setup_test_db().await;
    let id = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;

    scout::update(
        &pool,
        id,
        &NewScout {
            name: "Robin Parker".to_string(),
            email: "robin@troop.example".to_string(),
            scout_group: "Group 2".to_string(),
            notes: "Moved up".to_string(),
            parent_contact: "dana@troop.example".to_string(),
        },
    )
    .await
    .expect("Update failed");

    let scout = scout::find_by_id(&pool, id)
        .await
        .expect("Lookup failed")
        .expect("Scout should exist");
    assert_eq!(scout.name, "Robin Parker");
    assert_eq!(scout.scout_group, "Group 2");
    assert_eq!(scout.notes, "Moved up");
}

#[tokio::test]
async fn test_delete_scout() {
    let pool = setup_test_db().await;
    let id = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;

    scout::delete(&pool, id).await.expect("Delete failed");
    assert!(scout::find_by_id(&pool, id).await.expect("Lookup failed").is_none());
}

#[tokio::test]
async fn test_adjust_points_total_clamps_at_zero() {
    let pool = setup_test_db().await;
    let id = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;

    scout::adjust_points_total(&pool, id, 5).await.expect("Adjust failed");
    scout::adjust_points_total(&pool, id, -3).await.expect("Adjust failed");
    let scout = scout::find_by_id(&pool, id).await.expect("Lookup failed").unwrap();
    assert_eq!(scout.points_total, 2);

    // A delta that would go negative clamps at zero
    scout::adjust_points_total(&pool, id, -10).await.expect("Adjust failed");
    let scout = scout::find_by_id(&pool, id).await.expect("Lookup failed").unwrap();
    assert_eq!(scout.points_total, 0);
}

#[tokio::test]
async fn test_filter_and_group_scouts() {
    let pool = setup_test_db().await;
    seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    seed_scout(&pool, "Sam Reed", "sam@troop.example", "Group 2").await;
    seed_scout(&pool, "Samira Cole", "samira@troop.example", "Group 1").await;
    let all = scout::find_all(&pool).await.expect("Fetch failed");

    // Case-insensitive substring search on name
    let hits = filter_scouts(all.clone(), "sam", "");
    assert_eq!(hits.len(), 2);

    // Group filter stacks on search
    let hits = filter_scouts(all.clone(), "sam", "Group 1");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Samira Cole");

    // Sections come out in the closed set's order, empty groups omitted
    let sections = group_by_scout_group(all);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].0, "Group 1");
    assert_eq!(sections[0].1.len(), 2);
    assert_eq!(sections[1].0, "Group 2");
    assert_eq!(sections[1].1.len(), 1);
}
