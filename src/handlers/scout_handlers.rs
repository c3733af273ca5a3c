use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::allowlist::normalize_email;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{require_manage_participants, set_flash};
use crate::auth::validate::{
    FormErrors, validate_email, validate_email_unique, validate_optional, validate_required,
};
use crate::auth::csrf;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::ListQuery;
use crate::models::groups;
use crate::models::scout::{self, NewScout, ScoutForm};
use crate::screens::Screen;
use crate::templates_structs::{PageContext, ScoutFormTemplate, ScoutListTemplate};

pub async fn list(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;

    let scouts = scout::find_all(&pool).await?;
    let filtered = scout::filter_scouts(scouts, &query.q, &query.group);
    let grouped = scout::group_by_scout_group(filtered);

    render(ScoutListTemplate {
        ctx,
        groups: grouped,
        search: query.q.clone(),
        group_filter: query.group.clone(),
    })
}

async fn validate_scout_form(
    pool: &DbPool,
    form: &ScoutForm,
    exclude_id: Option<i64>,
) -> Result<FormErrors, AppError> {
    let mut errors = FormErrors::new();
    errors.check("name", validate_required(&form.name, "Name", 100));
    errors.check("email", validate_email(&form.email));
    if !groups::VALID_GROUPS.contains(&form.scout_group.as_str()) {
        errors.add("scout_group", "Select a valid group".to_string());
    }
    errors.check("notes", validate_optional(&form.notes, "Notes", 500));
    errors.check(
        "parent_contact",
        validate_optional(&form.parent_contact, "Parent contact", 200),
    );

    // Uniqueness is checked against the fetched collection, the way the list
    // screens see it; the unique index is the backstop.
    if errors.get("email").is_none() {
        let existing: Vec<(i64, String)> = scout::find_all(pool)
            .await?
            .into_iter()
            .map(|s| (s.id, s.email))
            .collect();
        errors.check(
            "email",
            validate_email_unique(&form.email, &existing, exclude_id),
        );
    }
    Ok(errors)
}

fn form_to_new(form: &ScoutForm) -> NewScout {
    NewScout {
        name: form.name.trim().to_string(),
        email: normalize_email(&form.email),
        scout_group: form.scout_group.clone(),
        notes: form.notes.trim().to_string(),
        parent_contact: form.parent_contact.trim().to_string(),
    }
}

pub async fn new_form(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;
    render(ScoutFormTemplate {
        ctx,
        form_action: "/scouts".to_string(),
        form_title: "Add Scout".to_string(),
        scout: None,
        errors: FormErrors::new(),
    })
}

pub async fn create(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    form: web::Form<ScoutForm>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let errors = validate_scout_form(&pool, &form, None).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;
        return render(ScoutFormTemplate {
            ctx,
            form_action: "/scouts".to_string(),
            form_title: "Add Scout".to_string(),
            scout: None,
            errors,
        });
    }

    let new = form_to_new(&form);
    match scout::create(&pool, &new).await {
        Ok(_) => {
            set_flash(&session, &format!("Scout '{}' was added", new.name));
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/scouts"))
                .finish())
        }
        Err(e) => {
            let mut errors = FormErrors::new();
            if e.to_string().contains("UNIQUE") {
                errors.add("email", "That email is already in use".to_string());
            } else {
                log::error!("Error creating scout: {e}");
                errors.add("name", "Could not save scout — please try again".to_string());
            }
            let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;
            render(ScoutFormTemplate {
                ctx,
                form_action: "/scouts".to_string(),
                form_title: "Add Scout".to_string(),
                scout: None,
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
    let scout = scout::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;
    render(ScoutFormTemplate {
        ctx,
        form_action: format!("/scouts/{id}"),
        form_title: "Edit Scout".to_string(),
        scout: Some(scout),
        errors: FormErrors::new(),
    })
}

pub async fn update(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<ScoutForm>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    let id = path.into_inner();
    let scout = scout::find_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;

    let errors = validate_scout_form(&pool, &form, Some(id)).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &pool, &roles, Screen::Scouts).await?;
        return render(ScoutFormTemplate {
            ctx,
            form_action: format!("/scouts/{id}"),
            form_title: "Edit Scout".to_string(),
            scout: Some(scout),
            errors,
        });
    }

    scout::update(&pool, id, &form_to_new(&form)).await?;
    set_flash(&session, "Scout updated");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/scouts"))
        .finish())
}

pub async fn delete(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<crate::handlers::auth_handlers::CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_manage_participants(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    scout::delete(&pool, path.into_inner()).await?;
    set_flash(&session, "Scout removed");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/scouts"))
        .finish())
}
