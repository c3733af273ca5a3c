//! Attendance engine tests: upsert idempotence, the incremental points delta,
//! roster assembly, and the authoritative recalculation.

mod common;

use chrono::NaiveDate;
use common::*;
use scoutpost::models::attendance::{self, AttendanceStatus, Roster};
use scoutpost::models::{meeting, scout};

async fn points_total(pool: &scoutpost::db::DbPool, scout_id: i64) -> i64 {
    scout::find_by_id(pool, scout_id)
        .await
        .expect("Lookup failed")
        .expect("Scout should exist")
        .points_total
}

#[tokio::test]
async fn test_remarking_leaves_a_single_row_with_latest_status() {
    let pool = setup_test_db().await;
    let robin = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    let m = seed_meeting(&pool, "2030-03-04", &["Group 1"], &[]).await;

    attendance::record(&pool, robin, m, AttendanceStatus::Present, 2, "dana@troop.example", None)
        .await
        .expect("Mark failed");
    let first = attendance::find_for_pair(&pool, robin, m)
        .await
        .expect("Lookup failed")
        .expect("Record should exist");
    assert_eq!(first.status, "Present");
    assert_eq!(first.points_earned, 3);

    // Re-mark as Absent: still exactly one row, fully replaced
    attendance::record(
        &pool,
        robin,
        m,
        AttendanceStatus::Absent,
        0,
        "dana@troop.example",
        Some(first.points_earned),
    )
    .await
    .expect("Re-mark failed");

    let records = attendance::find_by_meeting(&pool, m).await.expect("Fetch failed");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, "Absent");
    assert_eq!(records[0].points_earned, 0);
}

#[tokio::test]
async fn test_points_delta_tracks_remarks() {
    let pool = setup_test_db().await;
    let robin = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    let m = seed_meeting(&pool, "2030-03-04", &["Group 1"], &[]).await;

    let outcome =
        attendance::record(&pool, robin, m, AttendanceStatus::Present, 2, "dana@troop.example", None)
            .await
            .expect("Mark failed");
    assert_eq!(outcome.points_earned, 3);
    assert_eq!(outcome.delta, 3);
    assert_eq!(points_total(&pool, robin).await, 3);

    // Downgrade to Absent: negative delta brings the cached total back down
    let outcome = attendance::record(
        &pool,
        robin,
        m,
        AttendanceStatus::Absent,
        0,
        "dana@troop.example",
        Some(3),
    )
    .await
    .expect("Re-mark failed");
    assert_eq!(outcome.delta, -3);
    assert_eq!(points_total(&pool, robin).await, 0);
}

#[tokio::test]
async fn test_points_accumulate_across_meetings() {
    let pool = setup_test_db().await;
    let robin = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    let m1 = seed_meeting(&pool, "2030-03-04", &["Group 1"], &[]).await;
    let m2 = seed_meeting(&pool, "2030-03-11", &["Group 1"], &[]).await;
    let m3 = seed_meeting(&pool, "2030-03-18", &["Group 1"], &[]).await;

    // Present +1, Absent +0, Present with 2 activity points +3
    attendance::record(&pool, robin, m1, AttendanceStatus::Present, 1, "dana@troop.example", None)
        .await
        .expect("Mark failed");
    attendance::record(&pool, robin, m2, AttendanceStatus::Absent, 0, "dana@troop.example", None)
        .await
        .expect("Mark failed");
    attendance::record(&pool, robin, m3, AttendanceStatus::Present, 2, "dana@troop.example", None)
        .await
        .expect("Mark failed");

    assert_eq!(points_total(&pool, robin).await, 5);
}

#[tokio::test]
async fn test_roster_covers_groups_and_flags_past_meetings() {
    let pool = setup_test_db().await;
    let robin = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    seed_scout(&pool, "Sam Reed", "sam@troop.example", "Group 2").await;
    let m = seed_meeting(&pool, "2030-03-04", &["Group 1"], &[]).await;
    attendance::record(&pool, robin, m, AttendanceStatus::Present, 0, "dana@troop.example", None)
        .await
        .expect("Mark failed");

    let meeting = meeting::find_by_id(&pool, m)
        .await
        .expect("Lookup failed")
        .expect("Meeting should exist");

    // Only Group 1 scouts appear; the recorded mark is carried in
    let today = NaiveDate::from_ymd_opt(2030, 3, 4).unwrap();
    let roster = Roster::load(&pool, meeting.clone(), today).await.expect("Load failed");
    assert_eq!(roster.entries.len(), 1);
    assert_eq!(roster.entries[0].scout.name, "Robin Park");
    assert_eq!(roster.entries[0].status, "Present");
    assert!(!roster.read_only);
    assert_eq!(roster.previous_points.get(&robin), Some(&1));

    // The day after the meeting, the roster is read-only
    let later = NaiveDate::from_ymd_opt(2030, 3, 5).unwrap();
    let roster = Roster::load(&pool, meeting, later).await.expect("Load failed");
    assert!(roster.read_only);
}

#[tokio::test]
async fn test_recalculate_totals_repairs_drift() {
    let pool = setup_test_db().await;
    let robin = seed_scout(&pool, "Robin Park", "robin@troop.example", "Group 1").await;
    let sam = seed_scout(&pool, "Sam Reed", "sam@troop.example", "Group 2").await;
    let m = seed_meeting(&pool, "2030-03-04", &["Group 1", "Group 2"], &[]).await;

    attendance::record(&pool, robin, m, AttendanceStatus::Present, 2, "dana@troop.example", None)
        .await
        .expect("Mark failed");
    attendance::record(&pool, sam, m, AttendanceStatus::Present, 0, "dana@troop.example", None)
        .await
        .expect("Mark failed");

    // Corrupt one cached total
    scout::adjust_points_total(&pool, robin, 40).await.expect("Adjust failed");
    assert_eq!(points_total(&pool, robin).await, 43);

    let updated = attendance::recalculate_totals(&pool).await.expect("Recalc failed");
    assert_eq!(updated, 2);
    assert_eq!(points_total(&pool, robin).await, 3);
    assert_eq!(points_total(&pool, sam).await, 1);

    // Idempotent: a second run changes nothing
    attendance::recalculate_totals(&pool).await.expect("Recalc failed");
    assert_eq!(points_total(&pool, robin).await, 3);
    assert_eq!(points_total(&pool, sam).await, 1);
}
