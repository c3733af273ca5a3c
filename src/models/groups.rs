//! The closed set of scout groups and the comma-separated encoding used for
//! multi-group columns (`leaders.scout_groups`, `meetings.scout_groups`).

pub const GROUP_1: &str = "Group 1";
pub const GROUP_2: &str = "Group 2";

pub const VALID_GROUPS: &[&str] = &[GROUP_1, GROUP_2];

/// Parse a comma-separated group column into a list, dropping empties.
pub fn parse_groups(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn join_groups(groups: &[String]) -> String {
    groups.join(",")
}

/// Whether two group sets share any group (roster membership test).
pub fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().any(|g| b.contains(g))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_and_drops_empties() {
        let groups = parse_groups("Group 1, Group 2,,");
        assert_eq!(groups, vec!["Group 1", "Group 2"]);
        assert_eq!(join_groups(&groups), "Group 1,Group 2");
        assert!(parse_groups("").is_empty());
    }

    #[test]
    fn overlap_checks_any_shared_group() {
        let a = vec![GROUP_1.to_string()];
        let b = vec![GROUP_1.to_string(), GROUP_2.to_string()];
        let c = vec![GROUP_2.to_string()];
        assert!(overlaps(&a, &b));
        assert!(!overlaps(&a, &c));
    }
}
