use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

use super::{RunContext, ScenarioPlan, TestScenario};
use crate::logic::sweep::{PATH_POOL, random_snapshot_parts, settled_session};
use questline_core::navigation::paths;
use questline_core::{
    AppState, CompletedQuestRecord, FunnelStep, MemoryRouter, QuestId, QuestLifecycleState,
    QuestRun, Router, SessionStatus, StepChange, decide,
};

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "welcome-entry",
            "Not Started User Lands On Welcome",
            ScenarioPlan::new().with_expectation(not_started_lands_on_welcome),
        ),
        TestScenario::new(
            "pending-quest",
            "Pending Quest Pulls User Forward",
            ScenarioPlan::new().with_expectation(pending_quest_pulls_user_forward),
        ),
        TestScenario::new(
            "first-quest-result",
            "First Quest Completion Shows Result",
            ScenarioPlan::new().with_expectation(first_quest_completion_shows_result),
        ),
        TestScenario::new(
            "app-stay",
            "Signed In Finished User Stays In App",
            ScenarioPlan::new().with_expectation(signed_in_finished_user_stays),
        ),
        TestScenario::new(
            "session-gate",
            "Signed Out Finished User Goes To Login",
            ScenarioPlan::new().with_expectation(signed_out_finished_user_goes_to_login),
        ),
        TestScenario::new(
            "branch-exclusion",
            "Untaken Branches Never Return",
            ScenarioPlan::new().with_expectation(branch_exclusion_expectation),
        ),
        TestScenario::new(
            "funnel-monotonic",
            "Funnel Step Is A Running Maximum",
            ScenarioPlan::new().with_expectation(funnel_monotonic_expectation),
        ),
        TestScenario::new(
            "fixed-point-sweep",
            "Redirect Destinations Are Fixed Points",
            ScenarioPlan::new().with_expectation(crate::logic::sweep::fixed_point_expectation),
        ),
        TestScenario::new(
            "guard-coalescing",
            "Mutation Bursts Settle In One Pass",
            ScenarioPlan::new().with_expectation(guard_coalescing_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn at(secs: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| anyhow!("timestamp {secs} out of range"))
}

fn pick<'a>(ctx: &mut RunContext, pool: &[&'a str]) -> Result<&'a str> {
    pool.choose(&mut ctx.rng)
        .copied()
        .ok_or_else(|| anyhow!("empty pool"))
}

pub fn not_started_lands_on_welcome(ctx: &mut RunContext) -> Result<()> {
    let quests = QuestLifecycleState::default();
    let dest = decide("/", SessionStatus::SignedOut, FunnelStep::NotStarted, &quests)
        .context("root should redirect a new user")?;
    anyhow::ensure!(
        dest.target_path == paths::WELCOME,
        "expected {}, got {}",
        paths::WELCOME,
        dest.target_path
    );

    let path = pick(ctx, PATH_POOL)?;
    let session = settled_session(&mut ctx.rng);
    let expected = !matches!(
        paths::Screen::classify(path),
        paths::Screen::Welcome | paths::Screen::Login
    );
    let redirected = decide(path, session, FunnelStep::NotStarted, &quests).is_some();
    anyhow::ensure!(
        redirected == expected,
        "{path} as {session:?}: redirect {redirected}, expected {expected}"
    );
    Ok(())
}

fn pending_quest_pulls_user_forward(ctx: &mut RunContext) -> Result<()> {
    let quests = QuestLifecycleState {
        pending_quest: Some(QuestRun::prepared("q1")),
        ..QuestLifecycleState::default()
    };
    let dest = decide(
        "/journal",
        SessionStatus::SignedIn,
        FunnelStep::IntroCompleted,
        &quests,
    )
    .context("pending quest should redirect")?;
    anyhow::ensure!(dest.target_path == paths::PENDING_QUEST);
    anyhow::ensure!(dest.param("id") == Some("q1"), "missing quest id param");

    let step = *[
        FunnelStep::IntroCompleted,
        FunnelStep::NotificationsRequested,
        FunnelStep::Completed,
    ]
    .choose(&mut ctx.rng)
    .ok_or_else(|| anyhow!("empty steps"))?;
    let session = settled_session(&mut ctx.rng);
    let dest = decide("/(app)/index", session, step, &quests)
        .context("pending quest should redirect from the app")?;
    anyhow::ensure!(
        dest.target_path == paths::PENDING_QUEST,
        "{step:?}/{session:?} went to {}",
        dest.target_path
    );
    Ok(())
}

fn first_quest_completion_shows_result(ctx: &mut RunContext) -> Result<()> {
    let first = ctx.engine.config().first_quest_id.clone();
    let quests = QuestLifecycleState {
        recent_completed_quest: Some(CompletedQuestRecord::completed(first, at(100)?)),
        ..QuestLifecycleState::default()
    };
    let ordinal = ctx.rng.gen_range(1..FunnelStep::FirstQuestCompleted.ordinal());
    let step = FunnelStep::from_ordinal(ordinal).context("ordinal out of range")?;
    let dest = decide("/", SessionStatus::Idle, step, &quests)
        .context("first quest completion should redirect")?;
    anyhow::ensure!(
        dest.href() == "/first-quest-result?outcome=completed",
        "got {}",
        dest.href()
    );
    Ok(())
}

pub fn signed_in_finished_user_stays(ctx: &mut RunContext) -> Result<()> {
    let quests = QuestLifecycleState::default();
    let path = pick(ctx, &["/(app)", "/(app)/index", "/(app)/journal", "/(app)/map"])?;
    let dest = decide(path, SessionStatus::SignedIn, FunnelStep::Completed, &quests);
    anyhow::ensure!(dest.is_none(), "{path} redirected to {dest:?}");
    Ok(())
}

fn signed_out_finished_user_goes_to_login(ctx: &mut RunContext) -> Result<()> {
    let quests = QuestLifecycleState::default();
    let path = pick(ctx, &["/(app)", "/(app)/index", "/(app)/journal"])?;
    let session = *[SessionStatus::SignedOut, SessionStatus::Idle]
        .choose(&mut ctx.rng)
        .ok_or_else(|| anyhow!("empty sessions"))?;
    let dest = decide(path, session, FunnelStep::Completed, &quests)
        .with_context(|| format!("{path} should be gated"))?;
    anyhow::ensure!(dest.target_path == paths::LOGIN, "went to {}", dest.target_path);
    Ok(())
}

/// Walk the bundled graph along random choices and check that siblings of
/// every choice drop out of the frontier.
fn branch_exclusion_expectation(ctx: &mut RunContext) -> Result<()> {
    let graph = ctx.engine.graph().clone();
    let mut log: Vec<CompletedQuestRecord> = Vec::new();
    let mut offered: Vec<QuestId> = graph.roots().to_vec();
    let mut clock = 0;

    while let Some(chosen) = offered.choose(&mut ctx.rng).cloned() {
        clock += 1;
        if ctx.rng.gen_bool(0.25) {
            log.push(CompletedQuestRecord::failed(chosen.clone(), at(clock)?));
            let retry = questline_core::resolve_available_quests(&log, &graph);
            anyhow::ensure!(retry == offered, "a failure moved the frontier");
            clock += 1;
        }
        log.push(CompletedQuestRecord::completed(chosen.clone(), at(clock)?));
        let available = questline_core::resolve_available_quests(&log, &graph);
        let node = graph
            .get(chosen.as_str())
            .with_context(|| format!("{chosen} missing from graph"))?;
        let successors: Vec<QuestId> = node.successors().cloned().collect();
        for sibling in offered.iter().filter(|id| **id != chosen) {
            anyhow::ensure!(
                successors.contains(sibling) || !available.contains(sibling),
                "sibling {sibling} of {chosen} is still offered"
            );
        }
        offered = available;
    }
    anyhow::ensure!(!log.is_empty(), "graph offered nothing");
    Ok(())
}

fn funnel_monotonic_expectation(ctx: &mut RunContext) -> Result<()> {
    let mut state = AppState::new();
    let mut high = FunnelStep::INITIAL;
    for _ in 0..32 {
        let attempted = FunnelStep::ALL[ctx.rng.gen_range(0..FunnelStep::ALL.len())];
        let change = state.progression_mut().set_step(attempted);
        let rejected = matches!(change, StepChange::Rejected { .. });
        anyhow::ensure!(
            rejected == (attempted < high),
            "{attempted} from {high} gave {change:?}"
        );
        high = high.max(attempted);
        anyhow::ensure!(
            state.progression().current_step() == high,
            "step {} is not the running maximum {high}",
            state.progression().current_step()
        );
    }
    Ok(())
}

/// Apply a random burst of mutations, then one flush must settle the route.
fn guard_coalescing_expectation(ctx: &mut RunContext) -> Result<()> {
    let (path, _, step, _) = random_snapshot_parts(&mut ctx.rng);
    let mut state = AppState::restored(step, Vec::new());
    let mut guard = ctx.engine.guard(MemoryRouter::new(path), &state);
    guard.flush(&state)?;

    let burst = ctx.rng.gen_range(1..6);
    for _ in 0..burst {
        match ctx.rng.gen_range(0..4) {
            0 => {
                state.session_mut().set_status(settled_session(&mut ctx.rng));
            }
            1 => {
                let next = FunnelStep::ALL[ctx.rng.gen_range(0..FunnelStep::ALL.len())];
                state.progression_mut().set_step(next);
            }
            2 => {
                let id = pick(ctx, &["quest-1", "quest-2", "side-quest"])?;
                state.quests_mut().prepare(id).ok();
            }
            _ => {
                let next = pick(ctx, PATH_POOL)?;
                guard.router_mut().push(next);
                guard.route_changed();
            }
        }
    }
    let redirects = guard.flush(&state)?;
    anyhow::ensure!(
        redirects.len() <= 1,
        "burst needed {} redirects: {redirects:?}",
        redirects.len()
    );
    let current = guard.router().current_path().to_string();
    let settled = ctx
        .engine
        .navigator()
        .decide(&state.snapshot(&current));
    anyhow::ensure!(settled.is_none(), "{current} still redirects to {settled:?}");
    anyhow::ensure!(state.changes().is_empty(), "flush left notifications behind");
    Ok(())
}
