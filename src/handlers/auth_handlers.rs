use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::allowlist::{Allowlist, normalize_email};
use crate::auth::{csrf, password};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::user::{self, LoginForm};
use crate::templates_structs::LoginTemplate;

/// Shown when the email is missing from the allowlist. Not retryable without
/// adding the email.
pub const NOT_INVITED_MSG: &str = "Access not granted — you're not on the invited list yet.";

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    // If already logged in, go straight to the dashboard.
    if session.get::<i64>("user_id").unwrap_or(None).is_some() {
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", "/dashboard"))
            .finish());
    }
    let csrf_token = csrf::get_or_create_token(&session);
    render(LoginTemplate {
        error: None,
        csrf_token,
    })
}

pub async fn login_submit(
    pool: web::Data<DbPool>,
    session: Session,
    allowlist: web::Data<Allowlist>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let email = normalize_email(&form.email);

    // Invite gate first: a miss ends on the login screen with no session,
    // regardless of credentials.
    if !allowlist.is_invited(&pool, &email).await {
        session.remove("user_id");
        session.remove("email");
        let csrf_token = csrf::get_or_create_token(&session);
        return render(LoginTemplate {
            error: Some(NOT_INVITED_MSG.to_string()),
            csrf_token,
        });
    }

    let found = user::find_by_email(&pool, &email).await?;
    let authenticated = match &found {
        Some(u) => password::verify_password(&form.password, &u.password).unwrap_or(false),
        None => false,
    };

    match (found, authenticated) {
        (Some(u), true) => {
            let _ = session.insert("user_id", u.id);
            let _ = session.insert("email", &email);
            Ok(HttpResponse::SeeOther()
                .insert_header(("Location", "/dashboard"))
                .finish())
        }
        _ => {
            let csrf_token = csrf::get_or_create_token(&session);
            render(LoginTemplate {
                error: Some("Invalid email or password".to_string()),
                csrf_token,
            })
        }
    }
}

#[derive(serde::Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session.purge();
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", "/login"))
        .finish())
}
