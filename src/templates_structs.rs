//! Template context structures for Askama templates.
//!
//! Every user-supplied string rendered through these structs goes through
//! Askama's automatic HTML escaping.

use actix_session::Session;
use askama::Template;

use crate::auth::capability;
use crate::auth::csrf;
use crate::auth::role_cache::RoleCache;
use crate::auth::session::{get_email, take_flash};
use crate::auth::validate::FormErrors;
use crate::db::DbPool;
use crate::errors::AppError;
use crate::models::attendance::{Roster, RosterEntry};
use crate::models::invited_user::InvitedUser;
use crate::models::leader::{Leader, LeaderDisplay};
use crate::models::meeting::{Meeting, MeetingListItem};
use crate::models::scout::Scout;
use crate::screens::Screen;

/// Common context shared by all authenticated pages.
pub struct PageContext {
    pub email: String,
    pub avatar_initial: String,
    pub role: String,
    pub is_admin: bool,
    pub can_manage: bool,
    pub can_take_attendance: bool,
    pub flash: Option<String>,
    pub csrf_token: String,
    pub active_screen: &'static str,
}

impl PageContext {
    pub async fn build(
        session: &Session,
        pool: &DbPool,
        roles: &RoleCache,
        screen: Screen,
    ) -> Result<Self, AppError> {
        let email = get_email(session)
            .map_err(|e| AppError::Session(format!("Failed to get email: {e}")))?;
        let (_, role) = crate::auth::session::current_role(session, pool, roles).await?;
        let csrf_token = csrf::get_or_create_token(session);
        let flash = take_flash(session);
        let avatar_initial = email
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string();
        Ok(Self {
            avatar_initial,
            is_admin: capability::is_admin(role.as_deref()),
            can_manage: capability::can_manage_participants(role.as_deref()),
            can_take_attendance: capability::can_take_attendance(role.as_deref()),
            role: role.unwrap_or_default(),
            email,
            flash,
            csrf_token,
            active_screen: screen.name(),
        })
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub scout_count: i64,
    pub leader_count: i64,
    pub meeting_count: i64,
    pub points_total: i64,
}

#[derive(Template)]
#[template(path = "scouts/list.html")]
pub struct ScoutListTemplate {
    pub ctx: PageContext,
    pub groups: Vec<(String, Vec<Scout>)>,
    pub search: String,
    pub group_filter: String,
}

#[derive(Template)]
#[template(path = "scouts/form.html")]
pub struct ScoutFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub scout: Option<Scout>,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "leaders/list.html")]
pub struct LeaderListTemplate {
    pub ctx: PageContext,
    pub leaders: Vec<LeaderDisplay>,
    pub search: String,
    pub group_filter: String,
}

#[derive(Template)]
#[template(path = "leaders/form.html")]
pub struct LeaderFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub leader: Option<Leader>,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "meetings/list.html")]
pub struct MeetingListTemplate {
    pub ctx: PageContext,
    pub weeks: Vec<(String, Vec<MeetingListItem>)>,
}

#[derive(Template)]
#[template(path = "meetings/form.html")]
pub struct MeetingFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub meeting: Option<Meeting>,
    /// Active leaders paired with the `checked` attribute ("" or "checked")
    /// for "currently assigned to this meeting".
    pub leader_options: Vec<(Leader, &'static str)>,
    pub errors: FormErrors,
}

/// One leader row on the roster, with the session-only roll-call status.
pub struct LeaderRosterRow {
    pub leader: Leader,
    pub status: String,
}

#[derive(Template)]
#[template(path = "attendance/roster.html")]
pub struct RosterTemplate {
    pub ctx: PageContext,
    pub meeting: Meeting,
    pub entries: Vec<RosterEntry>,
    pub leader_rows: Vec<LeaderRosterRow>,
    pub read_only: bool,
}

impl RosterTemplate {
    pub fn from_roster(
        ctx: PageContext,
        roster: Roster,
        leader_rows: Vec<LeaderRosterRow>,
    ) -> Self {
        RosterTemplate {
            ctx,
            read_only: roster.read_only,
            meeting: roster.meeting,
            entries: roster.entries,
            leader_rows,
        }
    }
}

#[derive(Template)]
#[template(path = "invites/list.html")]
pub struct InviteListTemplate {
    pub ctx: PageContext,
    pub invites: Vec<InvitedUser>,
    pub errors: FormErrors,
}
