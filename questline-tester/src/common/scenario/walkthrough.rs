//! Full onboarding run through the engine and guard, with random detours.
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use super::{RunContext, ScenarioPlan, TestScenario};
use crate::logic::sweep::PATH_POOL;
use questline_core::navigation::paths::{self, Screen};
use questline_core::{
    AppState, FunnelStep, MemoryRouter, NavigationGuard, Navigator, QuestId, Router,
    SessionStatus,
};

const MAX_FAILED_ATTEMPTS: usize = 3;

pub fn walkthrough_scenario() -> TestScenario {
    TestScenario::new(
        "walkthrough",
        "Randomized Onboarding Walkthrough",
        ScenarioPlan::new().with_expectation(walkthrough_expectation),
    )
}

struct Walk<'a> {
    guard: NavigationGuard<MemoryRouter>,
    navigator: &'a Navigator,
    rng: &'a mut ChaCha8Rng,
    clock: i64,
}

impl Walk<'_> {
    /// Flush pending notifications; the route must settle in one redirect.
    fn settle(&mut self, state: &AppState) -> Result<()> {
        let redirects = self.guard.flush(state)?;
        anyhow::ensure!(
            redirects.len() <= 1,
            "route took {} redirects to settle: {redirects:?}",
            redirects.len()
        );
        let current = self.guard.router().current_path();
        let pending = self.navigator.decide(&state.snapshot(current));
        anyhow::ensure!(pending.is_none(), "{current} still redirects to {pending:?}");
        Ok(())
    }

    /// Sometimes navigate somewhere arbitrary, as an impatient user would.
    fn wander(&mut self, state: &AppState) -> Result<()> {
        if self.rng.gen_bool(0.5) {
            let path = PATH_POOL
                .choose(self.rng)
                .copied()
                .ok_or_else(|| anyhow!("empty path pool"))?;
            self.visit(state, path)?;
        }
        Ok(())
    }

    fn visit(&mut self, state: &AppState, path: &str) -> Result<()> {
        self.guard.router_mut().push(path);
        self.guard.route_changed();
        self.settle(state)
    }

    fn screen(&self) -> Screen {
        Screen::classify(self.guard.router().current_path())
    }

    fn current(&self) -> &str {
        self.guard.router().current_path()
    }

    fn tick(&mut self) -> Result<DateTime<Utc>> {
        self.clock += 60;
        Utc.timestamp_opt(self.clock, 0)
            .single()
            .ok_or_else(|| anyhow!("clock overflow"))
    }
}

pub fn walkthrough_expectation(ctx: &mut RunContext) -> Result<()> {
    let RunContext { rng, engine, .. } = ctx;
    let mut state = engine.bootstrap()?;
    let mut walk = Walk {
        guard: engine.guard(MemoryRouter::new(paths::ROOT), &state),
        navigator: engine.navigator(),
        rng,
        clock: 0,
    };

    walk.settle(&state)?;
    anyhow::ensure!(walk.current() == paths::WELCOME, "new user at {}", walk.current());

    state.session_mut().set_status(SessionStatus::SignedOut);
    for step in [
        FunnelStep::CharacterSelected,
        FunnelStep::IntroCompleted,
        FunnelStep::NotificationsRequested,
    ] {
        state.progression_mut().set_step(step);
        walk.settle(&state)?;
        walk.wander(&state)?;
    }

    let first = engine.config().first_quest_id.clone();
    let mut failures = 0;
    loop {
        state.quests_mut().prepare(first.clone())?;
        walk.settle(&state)?;
        anyhow::ensure!(
            matches!(walk.screen(), Screen::PendingQuest | Screen::FirstQuestResult),
            "prepared quest left user at {}",
            walk.current()
        );

        let started = walk.tick()?;
        state.quests_mut().start(started)?;
        state.progression_mut().set_step(FunnelStep::FirstQuestStarted);
        walk.visit(&state, &paths::quest_detail_path(first.as_str()))?;

        let stopped = walk.tick()?;
        if failures < MAX_FAILED_ATTEMPTS && walk.rng.gen_bool(0.3) {
            failures += 1;
            state.quests_mut().fail(stopped)?;
            walk.settle(&state)?;
            anyhow::ensure!(
                walk.current() == "/first-quest-result?outcome=failed",
                "failed first quest landed on {}",
                walk.current()
            );
            state.quests_mut().clear_failed_quest();
            continue;
        }
        state.quests_mut().complete(stopped)?;
        walk.settle(&state)?;
        anyhow::ensure!(
            walk.current() == "/first-quest-result?outcome=completed",
            "completed first quest landed on {}",
            walk.current()
        );
        break;
    }

    state.progression_mut().set_step(FunnelStep::FirstQuestCompleted);
    walk.settle(&state)?;
    walk.wander(&state)?;
    anyhow::ensure!(
        walk.screen() == Screen::FirstQuestResult || walk.screen().is_signup(),
        "celebration escaped to {}",
        walk.current()
    );

    walk.visit(&state, paths::SIGNUP_PROMPT)?;
    state.progression_mut().set_step(FunnelStep::SignupPromptShown);
    walk.settle(&state)?;

    if walk.rng.gen_bool(0.5) {
        walk.visit(&state, paths::SIGNUP)?;
        state.session_mut().set_status(SessionStatus::SignedIn);
        state.progression_mut().set_step(FunnelStep::Completed);
        walk.settle(&state)?;
    } else {
        state.progression_mut().set_step(FunnelStep::Completed);
        walk.settle(&state)?;
        anyhow::ensure!(
            walk.current() == paths::LOGIN,
            "dismissed prompt landed on {}",
            walk.current()
        );
        state.session_mut().set_status(SessionStatus::SignedIn);
        walk.settle(&state)?;
    }
    state.quests_mut().clear_recent_completed_quest();
    walk.settle(&state)?;
    anyhow::ensure!(
        walk.screen() == Screen::App,
        "finished user landed on {}",
        walk.current()
    );

    let expected: Vec<QuestId> = engine
        .graph()
        .get(first.as_str())
        .with_context(|| format!("first quest {first} missing from graph"))?
        .successors()
        .cloned()
        .collect();
    anyhow::ensure!(
        engine.available_quests(&state) == expected,
        "frontier after onboarding is {:?}",
        engine.available_quests(&state)
    );

    engine.persist(&state)?;
    let restored = engine.bootstrap()?;
    anyhow::ensure!(
        restored.progression().current_step() == FunnelStep::Completed,
        "restored step {}",
        restored.progression().current_step()
    );
    anyhow::ensure!(
        restored.quests().completed_quests().len() == failures + 1,
        "restored {} history entries for {failures} failures",
        restored.quests().completed_quests().len()
    );
    Ok(())
}
