use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::auth::csrf;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{get_email, require_admin, require_take_attendance, set_flash};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::guard::OpGuard;
use crate::models::attendance::{self, AttendanceStatus, LeaderMarkForm, LeaderRollCall, MarkForm, Roster};
use crate::models::leader;
use crate::models::meeting;
use crate::screens::Screen;
use crate::templates_structs::{LeaderRosterRow, PageContext, RosterTemplate};

async fn leader_rows(
    pool: &DbPool,
    roll_call: &LeaderRollCall,
    meeting_id: i64,
) -> Result<Vec<LeaderRosterRow>, AppError> {
    let assigned = meeting::find_assigned_leader_ids(pool, meeting_id).await?;
    let mut rows = Vec::new();
    for leader_id in assigned {
        if let Some(leader) = leader::find_by_id(pool, leader_id).await? {
            let status = roll_call
                .get(meeting_id, leader_id)
                .map(|s| s.as_str().to_string())
                .unwrap_or_default();
            rows.push(LeaderRosterRow { leader, status });
        }
    }
    Ok(rows)
}

pub async fn roster(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    roll_call: web::Data<LeaderRollCall>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_take_attendance(&session, &pool, &roles).await?;
    let meeting_id = path.into_inner();
    let meeting = meeting::find_by_id(&pool, meeting_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let today = Local::now().date_naive();
    let roster = Roster::load(&pool, meeting, today).await?;
    let leader_rows = leader_rows(&pool, &roll_call, meeting_id).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Attendance).await?;
    render(RosterTemplate::from_roster(ctx, roster, leader_rows))
}

pub async fn mark(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    guard: web::Data<OpGuard>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<MarkForm>,
) -> Result<HttpResponse, AppError> {
    require_take_attendance(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();
    let roster_url = format!("/meetings/{meeting_id}/attendance");

    let meeting = meeting::find_by_id(&pool, meeting_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let today = Local::now().date_naive();
    if meeting.is_past(today) {
        set_flash(&session, "This meeting is in the past — attendance is read-only");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", roster_url))
            .finish());
    }

    let Some(status) = AttendanceStatus::parse(&form.status) else {
        set_flash(&session, "Unknown attendance status");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", roster_url))
            .finish());
    };

    // One in-flight mark per (scout, meeting); a double submit bounces.
    let key = OpGuard::attendance_key(form.scout_id, meeting_id);
    let Some(_token) = guard.begin(&key) else {
        set_flash(&session, "That attendance update is already in progress");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", roster_url))
            .finish());
    };

    let recorded_by = get_email(&session)
        .map_err(|e| AppError::Session(format!("Failed to get email: {e}")))?;
    let previous = attendance::find_for_pair(&pool, form.scout_id, meeting_id)
        .await?
        .map(|r| r.points_earned);

    let outcome = attendance::record(
        &pool,
        form.scout_id,
        meeting_id,
        status,
        form.activity_points,
        &recorded_by,
        previous,
    )
    .await?;

    set_flash(
        &session,
        &format!("Marked {} ({} pts)", status.as_str(), outcome.points_earned),
    );
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", roster_url))
        .finish())
}

/// Leader roll call is session-state only and never reaches the database.
pub async fn mark_leader(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    roll_call: web::Data<LeaderRollCall>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<LeaderMarkForm>,
) -> Result<HttpResponse, AppError> {
    require_take_attendance(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let meeting_id = path.into_inner();
    let roster_url = format!("/meetings/{meeting_id}/attendance");

    match AttendanceStatus::parse(&form.status) {
        Some(status) => {
            roll_call.mark(meeting_id, form.leader_id, status);
            set_flash(&session, &format!("Leader marked {}", status.as_str()));
        }
        None => set_flash(&session, "Unknown attendance status"),
    }
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", roster_url))
        .finish())
}

/// Admin-only full reconciliation of every scout's points_total.
pub async fn recalculate(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    guard: web::Data<OpGuard>,
    session: Session,
    form: web::Form<crate::handlers::auth_handlers::CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(_token) = guard.begin(OpGuard::RECALC_KEY) else {
        set_flash(&session, "A recalculation is already running");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    };

    let updated = attendance::recalculate_totals(&pool).await?;
    log::info!("Recalculated points totals for {updated} scouts");
    set_flash(&session, &format!("Recalculated totals for {updated} scouts"));
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/dashboard"))
        .finish())
}
