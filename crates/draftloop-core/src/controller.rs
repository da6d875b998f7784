/// Number of critiques a run may request before it must stop
pub const REVISION_CAP: u32 = 5;

/// Position of the loop between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// A draft is needed next. Runs start here.
    AwaitingDraft,
    /// A draft was just produced; the revision count decides what follows
    AwaitingCritique,
    Done,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Done)
    }
}

/// Where the loop goes after a draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Critique,
    Done,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Critique => write!(f, "critique"),
            Route::Done => write!(f, "done"),
        }
    }
}

/// Decide the step after a draft. Depends on the revision count alone.
pub fn route_after_draft(revisions: u32) -> Route {
    if revisions >= REVISION_CAP {
        Route::Done
    } else {
        Route::Critique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_to_critique_below_cap() {
        assert_eq!(route_after_draft(0), Route::Critique);
        assert_eq!(route_after_draft(4), Route::Critique);
    }

    #[test]
    fn test_stops_at_cap_inclusive() {
        assert_eq!(route_after_draft(5), Route::Done);
        assert_eq!(route_after_draft(6), Route::Done);
    }

    #[test]
    fn test_decision_is_stable() {
        for revisions in 0..=REVISION_CAP + 1 {
            assert_eq!(route_after_draft(revisions), route_after_draft(revisions));
        }
    }

    #[test]
    fn test_only_done_is_terminal() {
        assert!(LoopState::Done.is_terminal());
        assert!(!LoopState::AwaitingDraft.is_terminal());
        assert!(!LoopState::AwaitingCritique.is_terminal());
    }
}
