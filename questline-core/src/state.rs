//! The three state containers the resolver reads, wired to one change queue.
use crate::changes::ChangeQueue;
use crate::funnel::{FunnelStep, Progression};
use crate::navigation::NavigationSnapshot;
use crate::quest::{CompletedQuestRecord, QuestLifecycle};
use crate::session::Session;

/// Session, progression, and quest lifecycle, sharing a change queue.
///
/// Containers are handed out by reference; each is mutated only through its
/// own actions, which mark the shared queue.
#[derive(Debug, Clone)]
pub struct AppState {
    session: Session,
    progression: Progression,
    quests: QuestLifecycle,
    changes: ChangeQueue,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::restored(FunnelStep::INITIAL, Vec::new())
    }

    /// Containers rebuilt from persisted progress.
    #[must_use]
    pub fn restored(step: FunnelStep, completed_quests: Vec<CompletedQuestRecord>) -> Self {
        let changes = ChangeQueue::new();
        Self {
            session: Session::new(changes.clone()),
            progression: Progression::restored(step, changes.clone()),
            quests: QuestLifecycle::restored(completed_quests, changes.clone()),
            changes,
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub const fn progression(&self) -> &Progression {
        &self.progression
    }

    pub const fn progression_mut(&mut self) -> &mut Progression {
        &mut self.progression
    }

    #[must_use]
    pub const fn quests(&self) -> &QuestLifecycle {
        &self.quests
    }

    pub const fn quests_mut(&mut self) -> &mut QuestLifecycle {
        &mut self.quests
    }

    #[must_use]
    pub const fn changes(&self) -> &ChangeQueue {
        &self.changes
    }

    /// Borrow a consistent snapshot for the resolver.
    #[must_use]
    pub fn snapshot<'a>(&'a self, path: &'a str) -> NavigationSnapshot<'a> {
        NavigationSnapshot::new(
            path,
            self.session.status(),
            self.progression.current_step(),
            self.quests.state(),
        )
    }
}
