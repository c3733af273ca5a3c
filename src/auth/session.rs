use actix_session::Session;

use crate::auth::capability;
use crate::auth::role_cache::RoleCache;
use crate::db::DbPool;
use crate::errors::AppError;

pub fn get_user_id(session: &Session) -> Option<i64> {
    session.get::<i64>("user_id").unwrap_or(None)
}

pub fn get_email(session: &Session) -> Result<String, String> {
    match session.get::<String>("email") {
        Ok(Some(email)) => Ok(email),
        Ok(None) => Err("No email in session".to_string()),
        Err(e) => Err(format!("Session error: {e}")),
    }
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

/// Resolve the current user's role via the session-scoped cache.
pub async fn current_role(
    session: &Session,
    pool: &DbPool,
    roles: &RoleCache,
) -> Result<(i64, Option<String>), AppError> {
    let user_id =
        get_user_id(session).ok_or_else(|| AppError::Session("Not authenticated".to_string()))?;
    let role = roles.resolve(pool, user_id).await;
    Ok((user_id, role))
}

/// Guard: Admin only.
pub async fn require_admin(
    session: &Session,
    pool: &DbPool,
    roles: &RoleCache,
) -> Result<i64, AppError> {
    let (user_id, role) = current_role(session, pool, roles).await?;
    if capability::is_admin(role.as_deref()) {
        Ok(user_id)
    } else {
        Err(AppError::PermissionDenied("admin".to_string()))
    }
}

/// Guard: Admin or Admin Leader.
pub async fn require_manage_participants(
    session: &Session,
    pool: &DbPool,
    roles: &RoleCache,
) -> Result<i64, AppError> {
    let (user_id, role) = current_role(session, pool, roles).await?;
    if capability::can_manage_participants(role.as_deref()) {
        Ok(user_id)
    } else {
        Err(AppError::PermissionDenied("manage_participants".to_string()))
    }
}

/// Guard: any role that takes attendance.
pub async fn require_take_attendance(
    session: &Session,
    pool: &DbPool,
    roles: &RoleCache,
) -> Result<i64, AppError> {
    let (user_id, role) = current_role(session, pool, roles).await?;
    if capability::can_take_attendance(role.as_deref()) {
        Ok(user_id)
    } else {
        Err(AppError::PermissionDenied("take_attendance".to_string()))
    }
}
