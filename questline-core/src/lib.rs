//! Questline progression core
//!
//! Platform-agnostic onboarding funnel, quest graph, and navigation gating for
//! a quest-driven mobile app. This crate has no UI or platform dependencies;
//! hosts plug in a [`DataLoader`], a [`KeyValueStore`], and a [`Router`].

pub mod changes;
pub mod config;
pub mod data;
pub mod funnel;
pub mod navigation;
pub mod quest;
pub mod session;
pub mod state;
pub mod store;

use anyhow::Context;

// Re-export commonly used types
pub use changes::{ChangeQueue, ChangeSource};
pub use config::NavigatorConfig;
pub use data::{DataLoader, NAVIGATOR_CONFIG, StaticDataError, StaticDataLoader};
pub use funnel::{FunnelStep, Progression, StepChange};
pub use navigation::{
    Decision, Destination, MemoryRouter, NavigationError, NavigationGuard, NavigationSnapshot,
    Navigator, Redirect, Router, Rule, Screen, decide,
};
pub use quest::{
    CompletedQuestRecord, Frontier, GraphError, LifecycleError, QuestGraph, QuestId,
    QuestLifecycle, QuestLifecycleState, QuestNode, QuestOption, QuestOutcome, QuestRun,
    resolve_available_quests,
};
pub use session::{Session, SessionStatus};
pub use state::AppState;
pub use store::{KeyValueStore, MemoryStore, PersistError, ProgressStore};

/// Progression engine wiring static data to persisted progress.
pub struct Questline<L, S>
where
    L: DataLoader,
    S: KeyValueStore,
{
    data_loader: L,
    progress: ProgressStore<S>,
    config: NavigatorConfig,
    graph: QuestGraph,
    navigator: Navigator,
}

impl<L, S> Questline<L, S>
where
    L: DataLoader,
    S: KeyValueStore,
{
    /// Load configuration and the quest graph.
    ///
    /// # Errors
    ///
    /// Returns an error if either cannot be loaded.
    pub fn new(data_loader: L, storage: S) -> anyhow::Result<Self> {
        let config: NavigatorConfig = data_loader
            .load_config(NAVIGATOR_CONFIG)
            .context("loading navigator configuration")?;
        let graph = data_loader
            .load_quest_graph()
            .context("loading quest graph")?;
        log::info!(
            "questline ready: {} quests, first quest {}",
            graph.len(),
            config.first_quest_id
        );
        Ok(Self {
            data_loader,
            progress: ProgressStore::new(storage, config.namespace.clone()),
            navigator: Navigator::from_config(&config),
            config,
            graph,
        })
    }

    #[must_use]
    pub const fn data_loader(&self) -> &L {
        &self.data_loader
    }

    #[must_use]
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    #[must_use]
    pub const fn graph(&self) -> &QuestGraph {
        &self.graph
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    #[must_use]
    pub const fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }

    /// Rebuild state containers from persisted progress.
    ///
    /// # Errors
    ///
    /// Returns an error if stored progress cannot be read.
    pub fn bootstrap(&self) -> anyhow::Result<AppState> {
        let state = self
            .progress
            .restore()
            .context("restoring persisted progress")?;
        log::info!(
            "bootstrapped at funnel step {} with {} completed quests",
            state.progression().current_step(),
            state.quests().completed_quests().len()
        );
        Ok(state)
    }

    /// Write the funnel step and completion log.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects a write.
    pub fn persist(&self, state: &AppState) -> anyhow::Result<()> {
        self.progress.save(state).context("persisting progress")?;
        log::info!(
            "persisted funnel step {}",
            state.progression().current_step()
        );
        Ok(())
    }

    #[must_use]
    pub fn frontier(&self, state: &AppState) -> Frontier {
        quest::frontier(state.quests().completed_quests(), &self.graph)
    }

    #[must_use]
    pub fn available_quests(&self, state: &AppState) -> Vec<QuestId> {
        resolve_available_quests(state.quests().completed_quests(), &self.graph)
    }

    /// Guard driving `router` from the containers of `state`.
    #[must_use]
    pub fn guard<R: Router>(&self, router: R, state: &AppState) -> NavigationGuard<R> {
        NavigationGuard::attach(router, state, &self.config)
    }

    /// Explicit user restart: funnel back to the start, quests cleared, store wiped.
    ///
    /// # Errors
    ///
    /// Returns an error if stored progress cannot be removed.
    pub fn reset(&self, state: &mut AppState) -> anyhow::Result<()> {
        state.progression_mut().reset();
        state.quests_mut().reset();
        self.progress.clear().context("clearing persisted progress")?;
        log::info!("progress reset");
        Ok(())
    }
}
