use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::allowlist::{MAX_INVITED, normalize_email};
use crate::auth::csrf;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{require_admin, set_flash};
use crate::auth::validate::{FormErrors, validate_email};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::handlers::auth_handlers::CsrfOnly;
use crate::models::invited_user::{self, InviteForm};
use crate::screens::Screen;
use crate::templates_structs::{InviteListTemplate, PageContext};

pub async fn list(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &pool, &roles).await?;
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Invites).await?;
    let invites = invited_user::find_all(&pool).await?;
    render(InviteListTemplate {
        ctx,
        invites,
        errors: FormErrors::new(),
    })
}

pub async fn add(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    form: web::Form<InviteForm>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let mut errors = FormErrors::new();
    errors.check("email", validate_email(&form.email));

    if errors.is_empty() {
        let email = normalize_email(&form.email);
        match invited_user::add(&pool, &email).await {
            Ok(_) => {
                let count = invited_user::find_all(&pool).await?.len();
                if count > MAX_INVITED {
                    log::warn!("Invite list has {count} entries (soft cap {MAX_INVITED})");
                    set_flash(
                        &session,
                        &format!("Invite added — note: the list now holds {count} emails"),
                    );
                } else {
                    set_flash(&session, "Invite added");
                }
                return Ok(HttpResponse::SeeOther()
                    .insert_header(("Location", "/invites"))
                    .finish());
            }
            Err(e) if e.to_string().contains("UNIQUE") => {
                errors.add("email", "That email is already invited".to_string());
            }
            Err(e) => return Err(e),
        }
    }

    let ctx = PageContext::build(&session, &pool, &roles, Screen::Invites).await?;
    let invites = invited_user::find_all(&pool).await?;
    render(InviteListTemplate {
        ctx,
        invites,
        errors,
    })
}

pub async fn remove(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    require_admin(&session, &pool, &roles).await?;
    csrf::validate_csrf(&session, &form.csrf_token)?;
    invited_user::remove(&pool, path.into_inner()).await?;
    set_flash(&session, "Invite removed");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/invites"))
        .finish())
}
