//! Session password gate.
//!
//! A literal string match against the configured password. This keeps casual
//! users out of the menu; it is not an access-control boundary.

/// State of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Default)]
pub struct Gate {
    expected: Option<String>,
}

impl Gate {
    /// A gate for the configured password. Blank or missing disables it.
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// Try to open the session with an attempt, if one was given.
    pub fn unlock(&self, attempt: Option<&str>) -> Session {
        match (&self.expected, attempt) {
            (None, _) => Session::Unlocked,
            (Some(expected), Some(attempt)) if attempt.trim_end_matches(['\r', '\n']) == expected => {
                Session::Unlocked
            }
            _ => Session::Locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_password_is_open() {
        assert_eq!(Gate::new(None).unlock(None), Session::Unlocked);
        assert_eq!(Gate::new(Some(String::new())).unlock(None), Session::Unlocked);
    }

    #[test]
    fn test_literal_match() {
        let gate = Gate::new(Some("eye123".into()));
        assert!(gate.is_enabled());
        assert_eq!(gate.unlock(None), Session::Locked);
        assert_eq!(gate.unlock(Some("EYE123")), Session::Locked);
        assert_eq!(gate.unlock(Some("eye123")), Session::Unlocked);
        // A line read from stdin still carries its terminator.
        assert_eq!(gate.unlock(Some("eye123\n")), Session::Unlocked);
    }
}
