use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::Local;

use crate::auth::csrf;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{require_manage_participants, set_flash};
use crate::auth::validate::{FormErrors, validate_groups, validate_meeting_date, validate_optional, validate_required};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::leader;
use crate::models::meeting::{self, MeetingForm, NewMeeting};
use crate::screens::Screen;
use crate::templates_structs::{MeetingFormTemplate, MeetingListTemplate, PageContext};

pub async fn list(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
    let meetings = meeting::find_all(&pool).await?;
    let weeks = meeting::group_by_week(meetings);
    render(MeetingListTemplate { ctx, weeks })
}

async fn validate_meeting_form(
    pool: &DbPool,
    form: &MeetingForm,
    exclude_id: Option<i64>,
) -> Result<FormErrors, AppError> {
    let mut errors = FormErrors::new();
    let today = Local::now().date_naive();
    errors.check("meeting_date", validate_meeting_date(&form.meeting_date, today));
    errors.check("location", validate_required(&form.location, "Location", 200));
    errors.check("scout_groups", validate_groups(&form.scout_groups));
    errors.check("notes", validate_optional(&form.notes, "Notes", 500));

    // Best-effort duplicate-date check; a race here is tolerated because the
    // unique constraint on meeting_date still catches a true duplicate.
    if errors.get("meeting_date").is_none()
        && meeting::date_taken(pool, form.meeting_date.trim(), exclude_id).await?
    {
        errors.add(
            "meeting_date",
            "A meeting already exists on that date".to_string(),
        );
    }
    Ok(errors)
}

fn form_to_new(form: &MeetingForm) -> NewMeeting {
    NewMeeting {
        meeting_date: form.meeting_date.trim().to_string(),
        location: form.location.trim().to_string(),
        scout_groups: form.scout_groups.clone(),
        notes: form.notes.trim().to_string(),
        assigned_leaders: form.assigned_leaders.clone(),
    }
}

async fn leader_options(
    pool: &DbPool,
    assigned: &[i64],
) -> Result<Vec<(leader::Leader, &'static str)>, AppError> {
    let active = leader::find_active(pool).await?;
    Ok(active
        .into_iter()
        .map(|l| {
            let checked = if assigned.contains(&l.id) { "checked" } else { "" };
            (l, checked)
        })
        .collect())
}

pub async fn new_form(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
    render(MeetingFormTemplate {
        ctx,
        form_action: "/meetings".to_string(),
        form_title: "Schedule Meeting".to_string(),
        meeting: None,
        leader_options: leader_options(&pool, &[]).await?,
        errors: FormErrors::new(),
    })
}

fn parse_form(body: &str) -> Result<MeetingForm, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed form body: {e}")))?;
    Ok(MeetingForm::from_pairs(pairs))
}

pub async fn create(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    body: String,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let form = parse_form(&body)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = validate_meeting_form(&pool, &form, None).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
        return render(MeetingFormTemplate {
            ctx,
            form_action: "/meetings".to_string(),
            form_title: "Schedule Meeting".to_string(),
            meeting: None,
            leader_options: leader_options(&pool, &form.assigned_leaders).await?,
            errors,
        });
    }

    match meeting::create(&pool, &form_to_new(&form)).await {
        Ok(_) => {
            set_flash(&session, "Meeting scheduled");
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/meetings"))
                .finish())
        }
        Err(e) => {
            let mut errors = FormErrors::new();
            if e.to_string().contains("UNIQUE") {
                // Lost the duplicate-check race; the constraint is the backstop.
                errors.add(
                    "meeting_date",
                    "A meeting already exists on that date".to_string(),
                );
            } else {
                log::error!("Error creating meeting: {e}");
                errors.add(
                    "location",
                    "Could not save meeting — please try again".to_string(),
                );
            }
            let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
            render(MeetingFormTemplate {
                ctx,
                form_action: "/meetings".to_string(),
                form_title: "Schedule Meeting".to_string(),
                meeting: None,
                leader_options: leader_options(&pool, &form.assigned_leaders).await?,
                errors,
            })
        }
    }
}

pub async fn edit_form(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let id = path.into_inner();
    let meeting = meeting::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;

    // A meeting with recorded attendance is frozen.
    if meeting::attendance_count(&pool, id).await? > 0 {
        set_flash(&session, "This meeting has attendance recorded and can no longer be edited");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/meetings"))
            .finish());
    }

    let assigned = meeting::find_assigned_leader_ids(&pool, id).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
    render(MeetingFormTemplate {
        ctx,
        form_action: format!("/meetings/{id}"),
        form_title: "Edit Meeting".to_string(),
        meeting: Some(meeting),
        leader_options: leader_options(&pool, &assigned).await?,
        errors: FormErrors::new(),
    })
}

pub async fn update(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    body: String,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let form = parse_form(&body)?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let meeting = meeting::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;

    // Checked before any write.
    if meeting::attendance_count(&pool, id).await? > 0 {
        set_flash(&session, "This meeting has attendance recorded and can no longer be edited");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/meetings"))
            .finish());
    }

    let errors = validate_meeting_form(&pool, &form, Some(id)).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Meetings).await?;
        return render(MeetingFormTemplate {
            ctx,
            form_action: format!("/meetings/{id}"),
            form_title: "Edit Meeting".to_string(),
            meeting: Some(meeting),
            leader_options: leader_options(&pool, &form.assigned_leaders).await?,
            errors,
        });
    }

    meeting::update(&pool, id, &form_to_new(&form)).await?;
    set_flash(&session, "Meeting updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/meetings"))
        .finish())
}

pub async fn delete(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    meeting::delete(&pool, path.into_inner()).await?;
    set_flash(&session, "Meeting removed");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/meetings"))
        .finish())
}
