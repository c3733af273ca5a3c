//! Capability predicates derived from the cached role string.
//!
//! Pure functions: no role (or an unrecognized role) implies no elevated
//! capability, so every failure upstream fails closed.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_ADMIN_LEADER: &str = "Admin Leader";
pub const ROLE_LEADER: &str = "Leader";
pub const ROLE_VIEWER: &str = "Viewer";

/// All roles an operator may assign, in rank order.
pub const ASSIGNABLE_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ADMIN_LEADER, ROLE_LEADER, ROLE_VIEWER];

pub fn is_admin(role: Option<&str>) -> bool {
    role == Some(ROLE_ADMIN)
}

/// Create/edit/delete scouts, leaders, meetings, and invites.
pub fn can_manage_participants(role: Option<&str>) -> bool {
    matches!(role, Some(ROLE_ADMIN) | Some(ROLE_ADMIN_LEADER))
}

/// Open a roster and mark attendance.
pub fn can_take_attendance(role: Option<&str>) -> bool {
    matches!(
        role,
        Some(ROLE_ADMIN) | Some(ROLE_ADMIN_LEADER) | Some(ROLE_LEADER)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_capability() {
        let role = Some(ROLE_ADMIN);
        assert!(is_admin(role));
        assert!(can_manage_participants(role));
        assert!(can_take_attendance(role));
    }

    #[test]
    fn leader_takes_attendance_but_does_not_manage() {
        let role = Some(ROLE_LEADER);
        assert!(!is_admin(role));
        assert!(!can_manage_participants(role));
        assert!(can_take_attendance(role));
    }

    #[test]
    fn viewer_and_no_role_fail_closed() {
        for role in [Some(ROLE_VIEWER), None, Some("Quartermaster")] {
            assert!(!is_admin(role));
            assert!(!can_manage_participants(role));
            assert!(!can_take_attendance(role));
        }
    }
}
