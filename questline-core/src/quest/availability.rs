//! Frontier of unlockable quests given the completion history.
//!
//! Only the most recent successful completion is inspected. Once the player
//! finishes one sibling of a choice, the frontier re-anchors on that sibling,
//! so branches the player did not take never come back.
use super::{CompletedQuestRecord, QuestGraph, QuestId};

/// Where the player stands in the static storyline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frontier {
    /// Nothing completed yet; the graph entry points are open.
    Roots(Vec<QuestId>),
    /// The last completed quest offers a choice among these successors.
    Choice {
        after: QuestId,
        options: Vec<QuestId>,
    },
    /// The last completed quest is terminal; the static storyline is exhausted.
    Exhausted { after: QuestId },
    /// The last completed quest is not part of the static graph; the caller
    /// should fall back to an external quest source.
    OffGraph { after: QuestId },
}

impl Frontier {
    #[must_use]
    pub fn quest_ids(&self) -> &[QuestId] {
        match self {
            Self::Roots(ids) | Self::Choice { options: ids, .. } => ids,
            Self::Exhausted { .. } | Self::OffGraph { .. } => &[],
        }
    }

    #[must_use]
    pub fn into_quest_ids(self) -> Vec<QuestId> {
        match self {
            Self::Roots(ids) | Self::Choice { options: ids, .. } => ids,
            Self::Exhausted { .. } | Self::OffGraph { .. } => Vec::new(),
        }
    }

    #[must_use]
    pub const fn needs_external_source(&self) -> bool {
        matches!(self, Self::OffGraph { .. })
    }
}

/// Latest successful completion; ties on `stop_time` go to the later log entry.
#[must_use]
pub fn most_recent_completion(log: &[CompletedQuestRecord]) -> Option<&CompletedQuestRecord> {
    log.iter()
        .filter(|record| record.is_success())
        .max_by_key(|record| record.stop_time)
}

#[must_use]
pub fn frontier(log: &[CompletedQuestRecord], graph: &QuestGraph) -> Frontier {
    let Some(latest) = most_recent_completion(log) else {
        return Frontier::Roots(graph.roots().to_vec());
    };
    let after = latest.id.clone();
    let Some(node) = graph.get(after.as_str()) else {
        return Frontier::OffGraph { after };
    };
    if node.is_terminal() {
        return Frontier::Exhausted { after };
    }
    let mut options: Vec<QuestId> = Vec::with_capacity(node.options.len());
    for next in node.successors() {
        if !options.contains(next) {
            options.push(next.clone());
        }
    }
    Frontier::Choice { after, options }
}

/// Quest ids currently unlockable. Empty when the storyline is exhausted or
/// the last completion is off-graph.
#[must_use]
pub fn resolve_available_quests(log: &[CompletedQuestRecord], graph: &QuestGraph) -> Vec<QuestId> {
    frontier(log, graph).into_quest_ids()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::{QuestNode, QuestOption};
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap()
    }

    fn node(id: &str, next: &[&str]) -> QuestNode {
        QuestNode {
            id: id.into(),
            title: String::new(),
            options: next
                .iter()
                .map(|target| QuestOption {
                    id: format!("{id}->{target}"),
                    text: String::new(),
                    next_quest_id: (*target).into(),
                })
                .collect(),
        }
    }

    /// quest-1 -> {quest-1a, quest-1b}; both lead to quest-2; quest-2 -> quest-3 (terminal).
    fn story() -> QuestGraph {
        QuestGraph::new(
            vec!["quest-1".into()],
            vec![
                node("quest-1", &["quest-1a", "quest-1b"]),
                node("quest-1a", &["quest-2"]),
                node("quest-1b", &["quest-2"]),
                node("quest-2", &["quest-3"]),
                node("quest-3", &[]),
            ],
        )
        .unwrap()
    }

    fn ids(values: &[&str]) -> BTreeSet<QuestId> {
        values.iter().map(|id| QuestId::from(*id)).collect()
    }

    #[test]
    fn empty_log_opens_roots() {
        let graph = story();
        assert_eq!(resolve_available_quests(&[], &graph), vec![QuestId::from("quest-1")]);
        assert_eq!(frontier(&[], &graph), Frontier::Roots(vec!["quest-1".into()]));
    }

    #[test]
    fn failures_alone_do_not_advance_the_frontier() {
        let graph = story();
        let log = [CompletedQuestRecord::failed("quest-1", at(5))];
        assert_eq!(resolve_available_quests(&log, &graph), vec![QuestId::from("quest-1")]);
    }

    #[test]
    fn completion_with_options_offers_a_choice() {
        let graph = story();
        let log = [CompletedQuestRecord::completed("quest-1", at(1))];
        let available: BTreeSet<_> = resolve_available_quests(&log, &graph).into_iter().collect();
        assert_eq!(available, ids(&["quest-1a", "quest-1b"]));
    }

    #[test]
    fn choosing_a_branch_hides_the_sibling() {
        let graph = story();
        let mut log = vec![
            CompletedQuestRecord::completed("quest-1", at(1)),
            CompletedQuestRecord::completed("quest-1a", at(2)),
        ];
        assert_eq!(resolve_available_quests(&log, &graph), vec![QuestId::from("quest-2")]);

        log.push(CompletedQuestRecord::completed("quest-2", at(3)));
        let later = resolve_available_quests(&log, &graph);
        assert_eq!(later, vec![QuestId::from("quest-3")]);
        assert!(!later.contains(&QuestId::from("quest-1b")));
    }

    #[test]
    fn most_recent_is_by_stop_time_not_position() {
        let graph = story();
        let log = [
            CompletedQuestRecord::completed("quest-1a", at(20)),
            CompletedQuestRecord::completed("quest-1", at(10)),
        ];
        assert_eq!(resolve_available_quests(&log, &graph), vec![QuestId::from("quest-2")]);
    }

    #[test]
    fn stop_time_ties_go_to_later_entry() {
        let log = [
            CompletedQuestRecord::completed("quest-1", at(7)),
            CompletedQuestRecord::completed("quest-1b", at(7)),
        ];
        assert_eq!(most_recent_completion(&log).map(|r| r.id.as_str()), Some("quest-1b"));
    }

    #[test]
    fn terminal_and_unknown_quests_yield_empty_frontier() {
        let graph = story();
        let terminal = [CompletedQuestRecord::completed("quest-3", at(1))];
        assert_eq!(
            frontier(&terminal, &graph),
            Frontier::Exhausted {
                after: "quest-3".into()
            }
        );
        assert!(resolve_available_quests(&terminal, &graph).is_empty());

        let remote = [CompletedQuestRecord::completed("server-quest-9", at(1))];
        let result = frontier(&remote, &graph);
        assert!(result.needs_external_source());
        assert!(result.quest_ids().is_empty());
    }

    #[test]
    fn converging_options_are_deduplicated() {
        let graph = QuestGraph::new(
            vec!["a".into()],
            vec![node("a", &["b", "b", "c"]), node("b", &[]), node("c", &[])],
        )
        .unwrap();
        let log = [CompletedQuestRecord::completed("a", at(1))];
        assert_eq!(
            resolve_available_quests(&log, &graph),
            vec![QuestId::from("b"), QuestId::from("c")]
        );
    }
}
