//! Lifecycle status of an entity.
//!
//! The in-flight action is a single tag, so two of creating, updating,
//! deleting and fetching can never hold at once. `loading` and `saving` are
//! predicates over that tag rather than separately mutated flags.

use serde::{Deserialize, Serialize};

use crate::Action;

/// The action currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    #[default]
    Idle,
    Fetching,
    Creating,
    Updating,
    Deleting,
}

impl From<Action> for Activity {
    fn from(action: Action) -> Self {
        match action {
            Action::Fetch => Activity::Fetching,
            Action::Create => Activity::Creating,
            Action::Update => Activity::Updating,
            Action::Delete => Activity::Deleting,
        }
    }
}

/// How the last provider call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing finished yet, or the last action was a successful fetch.
    #[default]
    None,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    pub activity: Activity,
    pub outcome: Outcome,
}

impl Status {
    pub fn is_loading(&self) -> bool {
        self.activity != Activity::Idle
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.activity, Activity::Creating | Activity::Updating)
    }

    pub fn is_fetching(&self) -> bool {
        self.activity == Activity::Fetching
    }

    pub fn is_creating(&self) -> bool {
        self.activity == Activity::Creating
    }

    pub fn is_updating(&self) -> bool {
        self.activity == Activity::Updating
    }

    pub fn is_deleting(&self) -> bool {
        self.activity == Activity::Deleting
    }

    pub fn is_error(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Marks `action` as in flight and forgets the previous outcome.
    pub(crate) fn begin(&mut self, action: Action) {
        self.activity = action.into();
        self.outcome = Outcome::None;
    }

    /// Returns to idle. A successful fetch leaves the outcome at `None`.
    pub(crate) fn finish(&mut self, action: Action, succeeded: bool) {
        self.activity = Activity::Idle;
        self.outcome = match (succeeded, action) {
            (false, _) => Outcome::Failure,
            (true, Action::Fetch) => Outcome::None,
            (true, _) => Outcome::Success,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
