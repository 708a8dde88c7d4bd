use chrono::{DateTime, TimeZone, Utc};
use questline_core::navigation::paths;
use questline_core::{
    CompletedQuestRecord, FunnelStep, MemoryRouter, MemoryStore, QuestId, Questline, Router, Rule,
    SessionStatus, StaticDataLoader,
};

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap()
}

fn ids(list: &[&str]) -> Vec<QuestId> {
    list.iter().map(|id| QuestId::from(*id)).collect()
}

#[test]
fn new_user_walks_the_whole_funnel() {
    let storage = MemoryStore::new();
    let engine = Questline::new(StaticDataLoader, storage.clone()).unwrap();
    let mut state = engine.bootstrap().unwrap();
    let mut guard = engine.guard(MemoryRouter::new(paths::ROOT), &state);

    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects[0].rule, Rule::FunnelEntry);
    assert_eq!(guard.router().current_path(), paths::WELCOME);

    state.session_mut().set_status(SessionStatus::SignedOut);
    state.progression_mut().set_step(FunnelStep::CharacterSelected);
    assert!(guard.flush(&state).unwrap().is_empty());

    guard.router_mut().push(paths::ONBOARDING);
    guard.route_changed();
    state.progression_mut().set_step(FunnelStep::IntroCompleted);
    state.progression_mut().set_step(FunnelStep::NotificationsRequested);
    assert!(guard.flush(&state).unwrap().is_empty());

    state.quests_mut().prepare("quest-1").unwrap();
    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects[0].rule, Rule::PendingQuest);
    assert_eq!(guard.router().current_path(), "/pending-quest?id=quest-1");

    state.quests_mut().start(at(100)).unwrap();
    state.progression_mut().set_step(FunnelStep::FirstQuestStarted);
    guard.router_mut().push(paths::quest_detail_path("quest-1"));
    guard.route_changed();
    assert!(guard.flush(&state).unwrap().is_empty());

    state.quests_mut().complete(at(200)).unwrap();
    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects[0].rule, Rule::FirstQuestCompleted);
    assert_eq!(
        guard.router().current_path(),
        "/first-quest-result?outcome=completed"
    );

    state.progression_mut().set_step(FunnelStep::FirstQuestCompleted);
    assert!(guard.flush(&state).unwrap().is_empty());
    assert!(!state.progression().has_completed_first_quest());

    guard.router_mut().push(paths::SIGNUP_PROMPT);
    guard.route_changed();
    state.progression_mut().set_step(FunnelStep::SignupPromptShown);
    assert!(guard.flush(&state).unwrap().is_empty());
    assert!(state.progression().has_seen_signup_prompt());

    guard.router_mut().push(paths::SIGNUP);
    guard.route_changed();
    assert!(guard.flush(&state).unwrap().is_empty());

    state.session_mut().set_status(SessionStatus::SignedIn);
    state.progression_mut().set_step(FunnelStep::Completed);
    state.quests_mut().clear_recent_completed_quest();
    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].rule, Rule::AppEntry);
    assert_eq!(guard.router().current_path(), paths::APP_ROOT);

    assert_eq!(
        engine.available_quests(&state),
        ids(&["quest-1a", "quest-1b"])
    );

    engine.persist(&state).unwrap();
    let engine = Questline::new(StaticDataLoader, storage).unwrap();
    let restored = engine.bootstrap().unwrap();
    assert_eq!(restored.progression().current_step(), FunnelStep::Completed);
    assert_eq!(
        engine.available_quests(&restored),
        ids(&["quest-1a", "quest-1b"])
    );
}

#[test]
fn failed_first_quest_can_be_retried() {
    let engine = Questline::new(StaticDataLoader, MemoryStore::new()).unwrap();
    let mut state = engine.bootstrap().unwrap();
    state.progression_mut().set_step(FunnelStep::NotificationsRequested);
    let mut guard = engine.guard(MemoryRouter::new(paths::ONBOARDING), &state);
    assert!(guard.flush(&state).unwrap().is_empty());

    state.quests_mut().prepare("quest-1").unwrap();
    state.quests_mut().start(at(10)).unwrap();
    state.progression_mut().set_step(FunnelStep::FirstQuestStarted);
    state.quests_mut().fail(at(20)).unwrap();
    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects[0].rule, Rule::FirstQuestFailed);
    assert_eq!(
        guard.router().current_path(),
        "/first-quest-result?outcome=failed"
    );
    assert_eq!(engine.available_quests(&state), ids(&["quest-1"]));

    state.quests_mut().clear_failed_quest();
    state.quests_mut().prepare("quest-1").unwrap();
    assert!(guard.flush(&state).unwrap().is_empty());

    guard.router_mut().push(paths::ONBOARDING);
    guard.route_changed();
    let redirects = guard.flush(&state).unwrap();
    assert_eq!(redirects[0].rule, Rule::PendingQuest);
    assert_eq!(guard.router().current_path(), "/pending-quest?id=quest-1");
}

#[test]
fn branch_not_taken_never_returns() {
    let engine = Questline::new(StaticDataLoader, MemoryStore::new()).unwrap();
    let state = questline_core::AppState::restored(
        FunnelStep::Completed,
        vec![
            CompletedQuestRecord::completed("quest-1", at(1)),
            CompletedQuestRecord::completed("quest-1a", at(2)),
        ],
    );
    let available = engine.available_quests(&state);
    assert_eq!(available, ids(&["quest-2"]));
    assert!(!available.contains(&QuestId::from("quest-1b")));
}

#[test]
fn backwards_step_is_ignored_by_the_guard() {
    let engine = Questline::new(StaticDataLoader, MemoryStore::new()).unwrap();
    let mut state = engine.bootstrap().unwrap();
    state.progression_mut().set_step(FunnelStep::IntroCompleted);
    let mut guard = engine.guard(MemoryRouter::new(paths::ONBOARDING), &state);
    assert!(guard.flush(&state).unwrap().is_empty());

    let change = state.progression_mut().set_step(FunnelStep::CharacterSelected);
    assert!(change.is_rejected());
    assert!(state.changes().is_empty());
    assert_eq!(state.progression().current_step(), FunnelStep::IntroCompleted);
}
