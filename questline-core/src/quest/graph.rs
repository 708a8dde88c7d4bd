//! Static quest graph loaded from JSON and validated as a DAG.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::QuestId;

/// A branch a player can pick after finishing a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestOption {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub next_quest_id: QuestId,
}

/// A narrative quest. Nodes without options end the static storyline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestNode {
    pub id: QuestId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub options: Vec<QuestOption>,
}

impl QuestNode {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }

    pub fn successors(&self) -> impl Iterator<Item = &QuestId> {
        self.options.iter().map(|option| &option.next_quest_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("quest graph JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("quest {0} is defined more than once")]
    DuplicateQuest(QuestId),
    #[error("root quest {0} is not defined")]
    UnknownRoot(QuestId),
    #[error("quest graph defines quests but no roots")]
    NoRoots,
    #[error("option {option} of quest {quest} points at undefined quest {target}")]
    DanglingOption {
        quest: QuestId,
        option: String,
        target: QuestId,
    },
    #[error("quest {0} is part of a cycle")]
    Cycle(QuestId),
}

/// On-disk shape of the graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct QuestGraphFile {
    roots: Vec<QuestId>,
    #[serde(default)]
    quests: Vec<QuestNode>,
}

/// Read-only directed acyclic graph of quests.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "QuestGraphFile", into = "QuestGraphFile")]
pub struct QuestGraph {
    roots: Vec<QuestId>,
    nodes: BTreeMap<QuestId, QuestNode>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

impl QuestGraph {
    /// Build and validate a graph.
    ///
    /// # Errors
    ///
    /// Returns an error if ids repeat, a root or option target is undefined,
    /// or the options form a cycle.
    pub fn new(roots: Vec<QuestId>, quests: Vec<QuestNode>) -> Result<Self, GraphError> {
        let mut nodes = BTreeMap::new();
        for quest in quests {
            if nodes.contains_key(&quest.id) {
                return Err(GraphError::DuplicateQuest(quest.id));
            }
            nodes.insert(quest.id.clone(), quest);
        }
        let graph = Self { roots, nodes };
        graph.validate()?;
        Ok(graph)
    }

    /// Graph with no quests at all; every lookup falls through to external sources.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a graph from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or the graph is invalid.
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let file: QuestGraphFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    #[must_use]
    pub fn roots(&self) -> &[QuestId] {
        &self.roots
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&QuestNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check that roots and option targets exist and the graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn validate(&self) -> Result<(), GraphError> {
        if self.roots.is_empty() && !self.nodes.is_empty() {
            return Err(GraphError::NoRoots);
        }
        if let Some(root) = self.roots.iter().find(|root| !self.contains(root.as_str())) {
            return Err(GraphError::UnknownRoot(root.clone()));
        }
        for node in self.nodes.values() {
            for option in &node.options {
                if !self.contains(option.next_quest_id.as_str()) {
                    return Err(GraphError::DanglingOption {
                        quest: node.id.clone(),
                        option: option.id.clone(),
                        target: option.next_quest_id.clone(),
                    });
                }
            }
        }
        if let Some(id) = self.find_cycle() {
            return Err(GraphError::Cycle(id));
        }
        Ok(())
    }

    /// Depth-first colouring with an explicit stack of `(quest, next option)`
    /// frames, so long chains do not grow the call stack.
    fn find_cycle(&self) -> Option<QuestId> {
        let mut visits: HashMap<&QuestId, Visit> = HashMap::with_capacity(self.nodes.len());
        let mut stack: Vec<(&QuestNode, usize)> = Vec::new();

        for start in self.nodes.values() {
            if visits.contains_key(&start.id) {
                continue;
            }
            visits.insert(&start.id, Visit::InProgress);
            stack.push((start, 0));

            while let Some((node, index)) = stack.pop() {
                let Some(option) = node.options.get(index) else {
                    visits.insert(&node.id, Visit::Done);
                    continue;
                };
                stack.push((node, index + 1));
                let next = &option.next_quest_id;
                match visits.get(next) {
                    Some(Visit::Done) => {}
                    Some(Visit::InProgress) => return Some(next.clone()),
                    None => {
                        if let Some((id, child)) = self.nodes.get_key_value(next) {
                            visits.insert(id, Visit::InProgress);
                            stack.push((child, 0));
                        }
                    }
                }
            }
        }
        None
    }
}

impl TryFrom<QuestGraphFile> for QuestGraph {
    type Error = GraphError;

    fn try_from(file: QuestGraphFile) -> Result<Self, Self::Error> {
        Self::new(file.roots, file.quests)
    }
}

impl From<QuestGraph> for QuestGraphFile {
    fn from(graph: QuestGraph) -> Self {
        Self {
            roots: graph.roots,
            quests: graph.nodes.into_values().collect(),
        }
    }
}
