//! Runtime quest slots: prepared, running, failed, recently completed, and the history log.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::QuestId;
use crate::changes::{ChangeQueue, ChangeSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestOutcome {
    Completed,
    Failed,
}

/// Entry of the chronological quest history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedQuestRecord {
    pub id: QuestId,
    pub stop_time: DateTime<Utc>,
    pub status: QuestOutcome,
}

impl CompletedQuestRecord {
    #[must_use]
    pub fn completed(id: impl Into<QuestId>, stop_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            stop_time,
            status: QuestOutcome::Completed,
        }
    }

    #[must_use]
    pub fn failed(id: impl Into<QuestId>, stop_time: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            stop_time,
            status: QuestOutcome::Failed,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == QuestOutcome::Completed
    }
}

/// A quest that has been prepared or is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRun {
    pub id: QuestId,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

impl QuestRun {
    #[must_use]
    pub fn prepared(id: impl Into<QuestId>) -> Self {
        Self {
            id: id.into(),
            started_at: None,
        }
    }
}

/// Snapshot of every quest slot the navigation resolver reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestLifecycleState {
    #[serde(default)]
    pub pending_quest: Option<QuestRun>,
    #[serde(default)]
    pub active_quest: Option<QuestRun>,
    #[serde(default)]
    pub failed_quest: Option<CompletedQuestRecord>,
    /// Set at completion time and cleared by the screen that shows it.
    #[serde(default)]
    pub recent_completed_quest: Option<CompletedQuestRecord>,
    #[serde(default)]
    pub completed_quests: Vec<CompletedQuestRecord>,
}

impl QuestLifecycleState {
    #[must_use]
    pub fn pending_id(&self) -> Option<&QuestId> {
        self.pending_quest.as_ref().map(|run| &run.id)
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&QuestId> {
        self.active_quest.as_ref().map(|run| &run.id)
    }

    #[must_use]
    pub fn failed_id(&self) -> Option<&QuestId> {
        self.failed_quest.as_ref().map(|record| &record.id)
    }

    #[must_use]
    pub fn recent_completed_id(&self) -> Option<&QuestId> {
        self.recent_completed_quest.as_ref().map(|record| &record.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("no quest is prepared to start")]
    NoPendingQuest,
    #[error("no quest is currently running")]
    NoActiveQuest,
    #[error("quest {0} is already running")]
    AlreadyRunning(QuestId),
}

/// Quest lifecycle container. Only its own actions mutate the slots.
#[derive(Debug, Clone, Default)]
pub struct QuestLifecycle {
    state: QuestLifecycleState,
    changes: ChangeQueue,
}

impl QuestLifecycle {
    #[must_use]
    pub fn new(changes: ChangeQueue) -> Self {
        Self {
            state: QuestLifecycleState::default(),
            changes,
        }
    }

    /// Rebuild a container from a persisted history; transient slots start empty.
    #[must_use]
    pub fn restored(completed_quests: Vec<CompletedQuestRecord>, changes: ChangeQueue) -> Self {
        Self {
            state: QuestLifecycleState {
                completed_quests,
                ..QuestLifecycleState::default()
            },
            changes,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &QuestLifecycleState {
        &self.state
    }

    #[must_use]
    pub fn completed_quests(&self) -> &[CompletedQuestRecord] {
        &self.state.completed_quests
    }

    /// Prepare a quest, replacing any previously prepared one.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::AlreadyRunning`] if the same quest is running.
    pub fn prepare(&mut self, id: impl Into<QuestId>) -> Result<(), LifecycleError> {
        let id = id.into();
        if self.state.active_id() == Some(&id) {
            return Err(LifecycleError::AlreadyRunning(id));
        }
        log::debug!("quest {id} prepared");
        self.state.pending_quest = Some(QuestRun::prepared(id));
        self.touch();
        Ok(())
    }

    pub fn cancel_pending(&mut self) -> Option<QuestRun> {
        let cancelled = self.state.pending_quest.take();
        if let Some(run) = &cancelled {
            log::debug!("prepared quest {} cancelled", run.id);
            self.touch();
        }
        cancelled
    }

    /// Move the prepared quest into the running slot.
    ///
    /// # Errors
    ///
    /// Fails when nothing is prepared or another quest is still running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<&QuestRun, LifecycleError> {
        if let Some(active) = self.state.active_id() {
            return Err(LifecycleError::AlreadyRunning(active.clone()));
        }
        let mut run = self
            .state
            .pending_quest
            .take()
            .ok_or(LifecycleError::NoPendingQuest)?;
        run.started_at = Some(now);
        log::debug!("quest {} started", run.id);
        self.touch();
        Ok(self.state.active_quest.insert(run))
    }

    /// Finish the running quest successfully.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoActiveQuest`] if nothing is running.
    pub fn complete(
        &mut self,
        stop_time: DateTime<Utc>,
    ) -> Result<CompletedQuestRecord, LifecycleError> {
        let run = self.take_active()?;
        let record = CompletedQuestRecord::completed(run.id, stop_time);
        if self.state.failed_id() == Some(&record.id) {
            self.state.failed_quest = None;
        }
        self.state.recent_completed_quest = Some(record.clone());
        self.state.completed_quests.push(record.clone());
        log::debug!("quest {} completed", record.id);
        self.touch();
        Ok(record)
    }

    /// Finish the running quest as failed.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoActiveQuest`] if nothing is running.
    pub fn fail(&mut self, stop_time: DateTime<Utc>) -> Result<CompletedQuestRecord, LifecycleError> {
        let run = self.take_active()?;
        let record = CompletedQuestRecord::failed(run.id, stop_time);
        self.state.failed_quest = Some(record.clone());
        self.state.completed_quests.push(record.clone());
        log::debug!("quest {} failed", record.id);
        self.touch();
        Ok(record)
    }

    pub fn clear_failed_quest(&mut self) -> Option<CompletedQuestRecord> {
        let cleared = self.state.failed_quest.take();
        if cleared.is_some() {
            self.touch();
        }
        cleared
    }

    pub fn clear_recent_completed_quest(&mut self) -> Option<CompletedQuestRecord> {
        let cleared = self.state.recent_completed_quest.take();
        if cleared.is_some() {
            self.touch();
        }
        cleared
    }

    /// Drop every slot and the history, for an explicit user restart.
    pub fn reset(&mut self) {
        if self.state == QuestLifecycleState::default() {
            return;
        }
        log::debug!("quest lifecycle reset");
        self.state = QuestLifecycleState::default();
        self.touch();
    }

    fn take_active(&mut self) -> Result<QuestRun, LifecycleError> {
        self.state
            .active_quest
            .take()
            .ok_or(LifecycleError::NoActiveQuest)
    }

    fn touch(&self) {
        self.changes.mark(ChangeSource::QuestLifecycle);
    }
}
