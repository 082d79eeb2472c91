//! Lifecycle contract consumed from the stack engine
//!
//! The orchestration engine drives each resource through
//! (action, status) pairs and persists them. This module carries the
//! narrow slice of that contract the adapters honor: state bookkeeping
//! around hook invocations and the bounded retry policy used by
//! confirmation polls. Scheduling, dependency ordering and rollback stay
//! with the engine.

use std::time::Duration;

/// Lifecycle action recorded for a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Init,
    Create,
    Update,
    Delete,
}

/// Outcome status of the recorded action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Complete,
    Failed,
}

/// The (action, status) pair the engine persists per resource, plus the
/// message attached when an action fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    pub action: Action,
    pub status: Status,
    pub reason: Option<String>,
}

impl ResourceState {
    /// Fresh resources start as (Init, Complete).
    pub fn new() -> Self {
        Self {
            action: Action::Init,
            status: Status::Complete,
            reason: None,
        }
    }

    /// Record the start of an action.
    pub fn begin(&mut self, action: Action) {
        self.action = action;
        self.status = Status::InProgress;
        self.reason = None;
    }

    /// Record the current action as complete.
    pub fn complete(&mut self) {
        self.status = Status::Complete;
        self.reason = None;
    }

    /// Record the current action as failed, attaching the error message.
    pub fn fail(&mut self, reason: &str) {
        self.status = Status::Failed;
        self.reason = Some(reason.to_string());
    }

    /// Re-mark the recorded state, e.g. to drive an already-deleted
    /// resource through delete again.
    pub fn state_set(&mut self, action: Action, status: Status, reason: &str) {
        self.action = action;
        self.status = status;
        self.reason = if reason.is_empty() {
            None
        } else {
            Some(reason.to_string())
        };
    }

    pub fn is(&self, action: Action, status: Status) -> bool {
        self.action == action && self.status == status
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded retry policy for confirmation polls. Zero attempts disables
/// the poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl PollPolicy {
    pub const DISABLED: PollPolicy = PollPolicy {
        max_attempts: 0,
        delay: Duration::ZERO,
    };

    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_attempts == 0
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_init_complete() {
        let state = ResourceState::new();
        assert!(state.is(Action::Init, Status::Complete));
        assert_eq!(state.reason, None);
    }

    #[test]
    fn begin_complete_fail_transitions() {
        let mut state = ResourceState::new();

        state.begin(Action::Create);
        assert!(state.is(Action::Create, Status::InProgress));

        state.complete();
        assert!(state.is(Action::Create, Status::Complete));

        state.begin(Action::Delete);
        state.fail("admin API returned 409: in use");
        assert!(state.is(Action::Delete, Status::Failed));
        assert_eq!(
            state.reason.as_deref(),
            Some("admin API returned 409: in use")
        );
    }

    #[test]
    fn state_set_re_marks() {
        let mut state = ResourceState::new();
        state.begin(Action::Delete);
        state.complete();

        state.state_set(Action::Create, Status::Complete, "to delete again");
        assert!(state.is(Action::Create, Status::Complete));
        assert_eq!(state.reason.as_deref(), Some("to delete again"));

        state.state_set(Action::Init, Status::Complete, "");
        assert_eq!(state.reason, None);
    }

    #[test]
    fn disabled_poll_policy() {
        assert!(PollPolicy::DISABLED.is_disabled());
        assert!(!PollPolicy::default().is_disabled());
    }
}
