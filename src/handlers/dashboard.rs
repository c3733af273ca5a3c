use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::role_cache::RoleCache;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::screens::Screen;
use crate::templates_structs::{DashboardTemplate, PageContext};

pub async fn index(
    pool: web::Data<DbPool>,
    roles: web::Data<RoleCache>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &pool, &roles, Screen::Dashboard).await?;

    let (scout_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scouts")
        .fetch_one(pool.get_ref())
        .await?;
    let (leader_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leaders WHERE active = 1")
        .fetch_one(pool.get_ref())
        .await?;
    let (meeting_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM meetings")
        .fetch_one(pool.get_ref())
        .await?;
    let (points_total,): (i64,) =
        sqlx::query_as("SELECT COALESCE(SUM(points_total), 0) FROM scouts")
            .fetch_one(pool.get_ref())
            .await?;

    render(DashboardTemplate {
        ctx,
        scout_count,
        leader_count,
        meeting_count,
        points_total,
    })
}
