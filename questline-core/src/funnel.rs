//! Onboarding funnel: ordered checkpoints and the forward-only progression machine.
use serde::{Deserialize, Serialize};

use crate::changes::{ChangeQueue, ChangeSource};

/// Checkpoint in the new-user onboarding sequence.
///
/// Declaration order is the funnel order; comparisons go through the derived
/// `Ord` rather than raw ordinals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum FunnelStep {
    #[default]
    NotStarted = 0,
    CharacterSelected = 1,
    IntroCompleted = 2,
    NotificationsRequested = 3,
    FirstQuestStarted = 4,
    FirstQuestCompleted = 5,
    SignupPromptShown = 6,
    Completed = 7,
}

impl FunnelStep {
    pub const ALL: &'static [Self] = &[
        Self::NotStarted,
        Self::CharacterSelected,
        Self::IntroCompleted,
        Self::NotificationsRequested,
        Self::FirstQuestStarted,
        Self::FirstQuestCompleted,
        Self::SignupPromptShown,
        Self::Completed,
    ];

    pub const INITIAL: Self = Self::NotStarted;
    pub const TERMINAL: Self = Self::Completed;

    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::CharacterSelected => "character-selected",
            Self::IntroCompleted => "intro-completed",
            Self::NotificationsRequested => "notifications-requested",
            Self::FirstQuestStarted => "first-quest-started",
            Self::FirstQuestCompleted => "first-quest-completed",
            Self::SignupPromptShown => "signup-prompt-shown",
            Self::Completed => "completed",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Steps between finishing the first quest and finishing the funnel, where
    /// the signup prompt owns navigation.
    #[must_use]
    pub const fn is_signup_in_flight(self) -> bool {
        matches!(self, Self::FirstQuestCompleted | Self::SignupPromptShown)
    }
}

impl std::fmt::Display for FunnelStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Result of a funnel mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChange {
    Advanced { from: FunnelStep, to: FunnelStep },
    Unchanged(FunnelStep),
    Rejected {
        current: FunnelStep,
        attempted: FunnelStep,
    },
}

impl StepChange {
    #[must_use]
    pub const fn is_rejected(self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    #[must_use]
    pub const fn current(self) -> FunnelStep {
        match self {
            Self::Advanced { to, .. } => to,
            Self::Unchanged(step) | Self::Rejected { current: step, .. } => step,
        }
    }
}

/// Holder of the single funnel step value.
///
/// All writes go through [`Progression::set_step`], which only moves forward.
/// [`Progression::reset`] is the explicit escape hatch for user-initiated
/// restarts.
#[derive(Debug, Clone, Default)]
pub struct Progression {
    step: FunnelStep,
    changes: ChangeQueue,
}

impl Progression {
    #[must_use]
    pub fn new(changes: ChangeQueue) -> Self {
        Self {
            step: FunnelStep::INITIAL,
            changes,
        }
    }

    /// Rebuild a container from a persisted step.
    #[must_use]
    pub const fn restored(step: FunnelStep, changes: ChangeQueue) -> Self {
        Self { step, changes }
    }

    #[must_use]
    pub const fn current_step(&self) -> FunnelStep {
        self.step
    }

    pub fn set_step(&mut self, next: FunnelStep) -> StepChange {
        let current = self.step;
        if next < current {
            log::warn!("rejected funnel step regression from {current} to {next}");
            return StepChange::Rejected {
                current,
                attempted: next,
            };
        }
        if next == current {
            return StepChange::Unchanged(current);
        }
        self.step = next;
        self.changes.mark(ChangeSource::Progression);
        log::debug!("funnel step advanced from {current} to {next}");
        StepChange::Advanced {
            from: current,
            to: next,
        }
    }

    pub fn reset(&mut self) -> StepChange {
        let from = self.step;
        if from == FunnelStep::INITIAL {
            return StepChange::Unchanged(from);
        }
        self.step = FunnelStep::INITIAL;
        self.changes.mark(ChangeSource::Progression);
        log::debug!("funnel step reset from {from}");
        StepChange::Advanced {
            from,
            to: FunnelStep::INITIAL,
        }
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.step.is_terminal()
    }

    #[must_use]
    pub fn has_completed_first_quest(&self) -> bool {
        self.step >= FunnelStep::SignupPromptShown
    }

    #[must_use]
    pub fn has_seen_signup_prompt(&self) -> bool {
        self.step >= FunnelStep::SignupPromptShown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_totally_ordered_by_declaration() {
        for pair in FunnelStep::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].ordinal() + 1, pair[1].ordinal());
        }
        assert_eq!(FunnelStep::from_ordinal(7), Some(FunnelStep::Completed));
        assert_eq!(FunnelStep::from_ordinal(8), None);
    }

    #[test]
    fn serialized_names_match_keys() {
        for step in FunnelStep::ALL {
            let json = serde_json::to_string(step).unwrap();
            assert_eq!(json, format!("\"{}\"", step.key()));
            let back: FunnelStep = serde_json::from_str(&json).unwrap();
            assert_eq!(back, *step);
        }
    }

    #[test]
    fn set_step_only_moves_forward() {
        let queue = ChangeQueue::new();
        let mut progression = Progression::new(queue.clone());

        let change = progression.set_step(FunnelStep::IntroCompleted);
        assert_eq!(
            change,
            StepChange::Advanced {
                from: FunnelStep::NotStarted,
                to: FunnelStep::IntroCompleted
            }
        );
        assert!(!queue.drain().is_empty());

        let change = progression.set_step(FunnelStep::CharacterSelected);
        assert!(change.is_rejected());
        assert_eq!(change.current(), FunnelStep::IntroCompleted);
        assert_eq!(progression.current_step(), FunnelStep::IntroCompleted);
        assert!(queue.is_empty(), "rejections must not notify");

        let change = progression.set_step(FunnelStep::IntroCompleted);
        assert_eq!(change, StepChange::Unchanged(FunnelStep::IntroCompleted));
        assert!(queue.is_empty(), "equal sets are no-ops");
    }

    #[test]
    fn observed_step_is_running_maximum() {
        let sequence = [
            FunnelStep::CharacterSelected,
            FunnelStep::FirstQuestStarted,
            FunnelStep::IntroCompleted,
            FunnelStep::FirstQuestStarted,
            FunnelStep::NotStarted,
            FunnelStep::Completed,
            FunnelStep::SignupPromptShown,
        ];
        let mut progression = Progression::default();
        let mut expected = progression.current_step();
        for step in sequence {
            let before = progression.current_step();
            progression.set_step(step);
            if step >= before {
                expected = step;
            }
            assert_eq!(progression.current_step(), expected);
            assert_eq!(progression.current_step(), before.max(step));
        }
    }

    #[test]
    fn reset_bypasses_the_guard() {
        let queue = ChangeQueue::new();
        let mut progression = Progression::restored(FunnelStep::Completed, queue.clone());
        assert!(progression.is_complete());

        let change = progression.reset();
        assert_eq!(change.current(), FunnelStep::NotStarted);
        assert_eq!(progression.current_step(), FunnelStep::NotStarted);
        assert!(queue.contains(ChangeSource::Progression));

        queue.drain();
        assert_eq!(
            progression.reset(),
            StepChange::Unchanged(FunnelStep::NotStarted)
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn predicates_follow_signup_prompt_threshold() {
        let mut progression = Progression::default();
        progression.set_step(FunnelStep::FirstQuestCompleted);
        assert!(!progression.has_completed_first_quest());
        assert!(!progression.has_seen_signup_prompt());
        assert!(!progression.is_complete());

        progression.set_step(FunnelStep::SignupPromptShown);
        assert!(progression.has_completed_first_quest());
        assert!(progression.has_seen_signup_prompt());

        progression.set_step(FunnelStep::Completed);
        assert!(progression.is_complete());
        assert!(FunnelStep::FirstQuestCompleted.is_signup_in_flight());
        assert!(!FunnelStep::Completed.is_signup_in_flight());
    }
}
