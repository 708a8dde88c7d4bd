use chrono::{DateTime, TimeZone, Utc};
use questline_core::{
    CompletedQuestRecord, FunnelStep, NavigationSnapshot, Navigator, QuestLifecycleState,
    QuestRun, SessionStatus,
};

const PATHS: &[&str] = &[
    "/",
    "/welcome",
    "/welcome/character",
    "/login",
    "/onboarding",
    "/first-quest-result",
    "/signup-prompt",
    "/signup",
    "/signup/email",
    "/pending-quest",
    "/quest/quest-1",
    "/quest/side-quest",
    "/(app)",
    "/(app)/index",
    "/(app)/journal",
    "/journal",
];

const QUEST_IDS: [Option<&str>; 3] = [None, Some("quest-1"), Some("side-quest")];

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

fn quest_states() -> Vec<QuestLifecycleState> {
    let mut states = Vec::new();
    for pending in QUEST_IDS {
        for failed in QUEST_IDS {
            for recent in QUEST_IDS {
                states.push(QuestLifecycleState {
                    pending_quest: pending.map(|id| QuestRun::prepared(id)),
                    failed_quest: failed.map(|id| CompletedQuestRecord::failed(id, at(10))),
                    recent_completed_quest: recent
                        .map(|id| CompletedQuestRecord::completed(id, at(20))),
                    ..QuestLifecycleState::default()
                });
            }
        }
    }
    states
}

#[test]
fn every_destination_is_a_fixed_point() {
    let navigator = Navigator::default();
    let quest_states = quest_states();
    let mut redirects = 0usize;

    for quests in &quest_states {
        for session in SessionStatus::ALL {
            for step in FunnelStep::ALL {
                for path in PATHS {
                    let snapshot = NavigationSnapshot::new(path, *session, *step, quests);
                    let Some(destination) = navigator.decide(&snapshot) else {
                        continue;
                    };
                    redirects += 1;
                    let href = destination.href();
                    let again = navigator.decide(&snapshot.at(&href));
                    assert_eq!(
                        again, None,
                        "{path} -> {href} redirected again for {session:?} {step:?} {quests:?}"
                    );
                }
            }
        }
    }
    assert!(redirects > 0, "grid never produced a redirect");
}

#[test]
fn hydrating_never_redirects() {
    let navigator = Navigator::default();
    for quests in &quest_states() {
        for step in FunnelStep::ALL {
            for path in PATHS {
                let snapshot = NavigationSnapshot::new(path, SessionStatus::Hydrating, *step, quests);
                assert!(navigator.decide(&snapshot).is_none(), "{path} {step:?}");
            }
        }
    }
}

#[test]
fn resolver_is_deterministic() {
    let navigator = Navigator::default();
    for quests in &quest_states() {
        for step in FunnelStep::ALL {
            for path in PATHS {
                let snapshot = NavigationSnapshot::new(path, SessionStatus::SignedOut, *step, quests);
                assert_eq!(navigator.decide(&snapshot), navigator.decide(&snapshot));
            }
        }
    }
}
