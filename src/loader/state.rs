//! Loader state machine.

/// Phase of a load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load in progress.
    #[default]
    Idle,
    /// Looking up the record and checking the workspace.
    Resolving,
    /// Clearing the workspace and validating markup.
    Resetting,
    /// Inserting content with change events disabled.
    SuppressedLoad,
    /// Content committed, scheduling the deferred redraw.
    Refreshing,
    /// The last attempt failed.
    Aborted,
}

impl LoadState {
    /// Check whether moving to `next` is allowed.
    pub fn can_transition_to(self, next: LoadState) -> bool {
        use LoadState::*;
        match (self, next) {
            (Idle | Aborted, Resolving) => true,
            (Resolving, Resetting) => true,
            (Resetting, SuppressedLoad) => true,
            (SuppressedLoad, Refreshing) => true,
            (Refreshing, Idle) => true,
            (Resolving | Resetting | SuppressedLoad | Refreshing, Aborted) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Resolving => write!(f, "resolving"),
            Self::Resetting => write!(f, "resetting"),
            Self::SuppressedLoad => write!(f, "suppressed load"),
            Self::Refreshing => write!(f, "refreshing"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_is_allowed() {
        let path = [
            LoadState::Idle,
            LoadState::Resolving,
            LoadState::Resetting,
            LoadState::SuppressedLoad,
            LoadState::Refreshing,
            LoadState::Idle,
        ];
        assert!(path.windows(2).all(|w| w[0].can_transition_to(w[1])));
    }

    #[test]
    fn test_abort_reachable_from_active_states() {
        for state in [
            LoadState::Resolving,
            LoadState::Resetting,
            LoadState::SuppressedLoad,
            LoadState::Refreshing,
        ] {
            assert!(state.can_transition_to(LoadState::Aborted));
        }
        assert!(!LoadState::Idle.can_transition_to(LoadState::Aborted));
    }

    #[test]
    fn test_no_skipping_phases() {
        assert!(!LoadState::Idle.can_transition_to(LoadState::SuppressedLoad));
        assert!(!LoadState::Resolving.can_transition_to(LoadState::Refreshing));
        assert!(LoadState::Aborted.can_transition_to(LoadState::Resolving));
    }
}
