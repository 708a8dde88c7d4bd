//! Seeded random snapshots for resolver property checks.
use anyhow::Result;
use chrono::{TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::common::scenario::RunContext;
use questline_core::{
    CompletedQuestRecord, FunnelStep, NavigationSnapshot, QuestLifecycleState, QuestRun,
    SessionStatus,
};

pub const PATH_POOL: &[&str] = &[
    "/",
    "/welcome",
    "/welcome/character",
    "/login",
    "/onboarding",
    "/first-quest-result",
    "/first-quest-result?outcome=failed",
    "/signup-prompt",
    "/signup",
    "/pending-quest",
    "/quest/quest-1",
    "/quest/side-quest",
    "/(app)",
    "/(app)/index",
    "/(app)/journal",
    "/journal",
    "/settings/",
];

const QUEST_POOL: &[&str] = &["quest-1", "quest-2", "side-quest"];

const SETTLED_SESSIONS: &[SessionStatus] = &[
    SessionStatus::Idle,
    SessionStatus::SignedOut,
    SessionStatus::SignedIn,
];

pub fn settled_session(rng: &mut ChaCha8Rng) -> SessionStatus {
    SETTLED_SESSIONS
        .choose(rng)
        .copied()
        .unwrap_or(SessionStatus::Idle)
}

fn maybe_quest(rng: &mut ChaCha8Rng) -> Option<&'static str> {
    if rng.gen_bool(0.5) {
        QUEST_POOL.choose(rng).copied()
    } else {
        None
    }
}

/// Random path, settled session, step, and quest slots.
pub fn random_snapshot_parts(
    rng: &mut ChaCha8Rng,
) -> (&'static str, SessionStatus, FunnelStep, QuestLifecycleState) {
    let path = PATH_POOL.choose(rng).copied().unwrap_or("/");
    let session = settled_session(rng);
    let step = FunnelStep::ALL[rng.gen_range(0..FunnelStep::ALL.len())];
    let stop_time = Utc.timestamp_opt(rng.gen_range(0..1_000_000), 0).single();
    let quests = QuestLifecycleState {
        pending_quest: maybe_quest(rng).map(|id| QuestRun::prepared(id)),
        failed_quest: maybe_quest(rng)
            .zip(stop_time)
            .map(|(id, at)| CompletedQuestRecord::failed(id, at)),
        recent_completed_quest: maybe_quest(rng)
            .zip(stop_time)
            .map(|(id, at)| CompletedQuestRecord::completed(id, at)),
        ..QuestLifecycleState::default()
    };
    (path, session, step, quests)
}

/// Draw `ctx.sweep_samples` snapshots; re-resolving at any destination must
/// yield no redirect.
pub fn fixed_point_expectation(ctx: &mut RunContext) -> Result<()> {
    let navigator = ctx.engine.navigator().clone();
    let mut redirects = 0usize;
    for _ in 0..ctx.sweep_samples {
        let (path, session, step, quests) = random_snapshot_parts(&mut ctx.rng);
        let snapshot = NavigationSnapshot::new(path, session, step, &quests);
        let Some(destination) = navigator.decide(&snapshot) else {
            continue;
        };
        redirects += 1;
        let href = destination.href();
        let again = navigator.decide(&snapshot.at(&href));
        anyhow::ensure!(
            again.is_none(),
            "{path} -> {href} -> {again:?} ({session:?}, {step:?}, {quests:?})"
        );
    }
    log::debug!(
        "fixed-point sweep seed {} checked {redirects} redirects",
        ctx.seed
    );
    Ok(())
}
