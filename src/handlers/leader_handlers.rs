use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::allowlist::normalize_email;
use crate::auth::csrf;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{require_manage_participants, set_flash};
use crate::auth::validate::{
    FormErrors, validate_email, validate_email_unique, validate_groups, validate_required,
};
use crate::auth::capability;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::ListQuery;
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::leader::{self, LeaderForm, LinkAccountForm, LinkOutcome, NewLeader};
use crate::models::user;
use crate::screens::Screen;
use crate::templates_structs::{LeaderFormTemplate, LeaderListTemplate, PageContext};

pub async fn list(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
    let leaders = leader::find_all(&pool).await?;
    let filtered = leader::filter_leaders(leaders, &query.q, &query.group);
    render(LeaderListTemplate {
        ctx,
        leaders: filtered,
        search: query.q.clone(),
        group_filter: query.group.clone(),
    })
}

async fn validate_leader_form(
    pool: &DbPool,
    form: &LeaderForm,
    exclude_id: Option<i64>,
) -> Result<FormErrors, AppError> {
    let mut errors = FormErrors::new();
    errors.check("name", validate_required(&form.name, "Name", 100));
    errors.check("email", validate_email(&form.email));
    errors.check("scout_groups", validate_groups(&form.scout_groups));

    if errors.get("email").is_none() {
        let existing: Vec<(i64, String)> = leader::find_all(pool)
            .await?
            .into_iter()
            .map(|l| (l.id, l.email))
            .collect();
        errors.check(
            "email",
            validate_email_unique(&form.email, &existing, exclude_id),
        );
    }
    Ok(errors)
}

fn form_to_new(form: &LeaderForm) -> NewLeader {
    NewLeader {
        name: form.name.trim().to_string(),
        email: normalize_email(&form.email),
        scout_groups: form.scout_groups.clone(),
    }
}

pub async fn new_form(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
    render(LeaderFormTemplate {
        ctx,
        form_action: "/leaders".to_string(),
        form_title: "Add Leader".to_string(),
        leader: None,
        errors: FormErrors::new(),
    })
}

fn parse_form(body: &str) -> Result<LeaderForm, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed form body: {e}")))?;
    Ok(LeaderForm::from_pairs(pairs))
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

    let errors = validate_leader_form(&pool, &form, None).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
        return render(LeaderFormTemplate {
            ctx,
            form_action: "/leaders".to_string(),
            form_title: "Add Leader".to_string(),
            leader: None,
            errors,
        });
    }

    let new = form_to_new(&form);
    match leader::create(&pool, &new).await {
        Ok(_) => {
            set_flash(&session, &format!("Leader '{}' was added", new.name));
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/leaders"))
                .finish())
        }
        Err(e) => {
            let mut errors = FormErrors::new();
            if e.to_string().contains("UNIQUE") {
                errors.add("email", "That email is already in use".to_string());
            } else {
                log::error!("Error creating leader: {e}");
                errors.add("name", "Could not save leader — please try again".to_string());
            }
            let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
            render(LeaderFormTemplate {
                ctx,
                form_action: "/leaders".to_string(),
                form_title: "Add Leader".to_string(),
                leader: None,
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
    let leader = leader::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
    render(LeaderFormTemplate {
        ctx,
        form_action: format!("/leaders/{id}"),
        form_title: "Edit Leader".to_string(),
        leader: Some(leader),
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
    let leader = leader::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;

    let errors = validate_leader_form(&pool, &form, Some(id)).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Leaders).await?;
        return render(LeaderFormTemplate {
            ctx,
            form_action: format!("/leaders/{id}"),
            form_title: "Edit Leader".to_string(),
            leader: Some(leader),
            errors,
        });
    }

    leader::update(&pool, id, &form_to_new(&form)).await?;
    set_flash(&session, "Leader updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/leaders"))
        .finish())
}

/// Soft-delete: the leader is marked inactive and unassigned from every
/// meeting, never removed outright.
pub async fn deactivate(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    leader::deactivate(&pool, path.into_inner()).await?;
    set_flash(&session, "Leader deactivated and unassigned from meetings");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/leaders"))
        .finish())
}

/// Link a leader to a login identity and assign a role. A role failure after
/// a successful link is reported as such, so the operator knows which half to
/// retry.
pub async fn link_account(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<LinkAccountForm>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let leader_id = path.into_inner();

    if !capability::ASSIGNABLE_ROLES.contains(&form.role.as_str()) {
        set_flash(&session, "Unknown role — account not linked");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/leaders"))
            .finish());
    }

    let email = normalize_email(&form.user_email);
    let target = user::find_by_email(&pool, &email).await?;
    let Some(target) = target else {
        set_flash(&session, "No account with that email — account not linked");
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/leaders"))
            .finish());
    };

    match leader::link_account(&pool, leader_id, target.id, &form.role).await? {
        LinkOutcome::Linked => {
            roles.invalidate(target.id).await;
            set_flash(&session, "Account linked and role assigned");
        }
        LinkOutcome::LinkedRoleFailed(reason) => {
            set_flash(
                &session,
                &format!("Account linked, but role assignment failed ({reason}) — assign the role manually"),
            );
        }
    }
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/leaders"))
        .finish())
}
