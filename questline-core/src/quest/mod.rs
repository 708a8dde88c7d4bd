//! Quests: the static narrative graph, the runtime lifecycle, and the frontier resolver.
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

pub mod availability;
pub mod graph;
pub mod lifecycle;

pub use availability::{Frontier, frontier, most_recent_completion, resolve_available_quests};
pub use graph::{GraphError, QuestGraph, QuestNode, QuestOption};
pub use lifecycle::{
    CompletedQuestRecord, LifecycleError, QuestLifecycle, QuestLifecycleState, QuestOutcome,
    QuestRun,
};

/// Identifier of a quest node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(String);

impl QuestId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for QuestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for QuestId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for QuestId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for QuestId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
