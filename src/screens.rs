//! Screen navigation state: a finite set of named screens with exactly one
//! active at a time. Transitions carry the CSS classes the stylesheet animates
//! (`slide-left` / `slide-right`); the rest is presentation.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Login,
    Dashboard,
    Scouts,
    Leaders,
    Meetings,
    Attendance,
    Invites,
}

impl Screen {
    pub const DEFAULT: Screen = Screen::Dashboard;

    /// Resolve a screen by name. Unknown names fall back to the default
    /// screen rather than erroring.
    pub fn from_name(name: &str) -> Screen {
        match name {
            "splash" => Screen::Splash,
            "login" => Screen::Login,
            "dashboard" => Screen::Dashboard,
            "scouts" => Screen::Scouts,
            "leaders" => Screen::Leaders,
            "meetings" => Screen::Meetings,
            "attendance" => Screen::Attendance,
            "invites" => Screen::Invites,
            _ => Screen::DEFAULT,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Splash => "splash",
            Screen::Login => "login",
            Screen::Dashboard => "dashboard",
            Screen::Scouts => "scouts",
            Screen::Leaders => "leaders",
            Screen::Meetings => "meetings",
            Screen::Attendance => "attendance",
            Screen::Invites => "invites",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// CSS state applied when a transition fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub entering: Screen,
    pub exiting: Screen,
    /// Class the incoming screen starts from before it becomes `active`.
    pub enter_from: &'static str,
    /// Class applied to the outgoing screen.
    pub exit_to: &'static str,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
}

impl Default for Navigator {
    fn default() -> Self {
        Navigator {
            current: Screen::Splash,
        }
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Transition to a target screen. Returns `None` (no-op) when the target
    /// is already active; otherwise marks the target active and describes the
    /// enter/exit animation.
    pub fn goto(&mut self, target: Screen, direction: Direction) -> Option<Transition> {
        if target == self.current {
            return None;
        }
        let (enter_from, exit_to) = match direction {
            Direction::Left => ("slide-right", "slide-left"),
            Direction::Right => ("slide-left", "slide-right"),
        };
        let transition = Transition {
            entering: target,
            exiting: self.current,
            enter_from,
            exit_to,
        };
        self.current = target;
        Some(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_to_active_screen_is_noop() {
        let mut nav = Navigator::new();
        assert_eq!(nav.current(), Screen::Splash);
        assert!(nav.goto(Screen::Splash, Direction::Left).is_none());
        assert_eq!(nav.current(), Screen::Splash);
    }

    #[test]
    fn transition_marks_target_active_with_direction_classes() {
        let mut nav = Navigator::new();
        let t = nav.goto(Screen::Login, Direction::Left).unwrap();
        assert_eq!(t.entering, Screen::Login);
        assert_eq!(t.exiting, Screen::Splash);
        assert_eq!(t.enter_from, "slide-right");
        assert_eq!(t.exit_to, "slide-left");
        assert_eq!(nav.current(), Screen::Login);

        let back = nav.goto(Screen::Splash, Direction::Right).unwrap();
        assert_eq!(back.enter_from, "slide-left");
        assert_eq!(back.exit_to, "slide-right");
    }

    #[test]
    fn unknown_screen_name_resolves_to_default() {
        assert_eq!(Screen::from_name("scouts"), Screen::Scouts);
        assert_eq!(Screen::from_name("no-such-screen"), Screen::DEFAULT);
    }
}
