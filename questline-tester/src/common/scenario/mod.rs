use anyhow::Result;
use questline_core::{MemoryStore, Questline, StaticDataLoader};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod catalog;
pub mod walkthrough;

use catalog::{catalog_scenarios, find_catalog_scenario};

/// Snapshots drawn per iteration by sweep scenarios.
pub const DEFAULT_SWEEP_SAMPLES: usize = 256;

/// Fresh engine and RNG handed to every expectation of one iteration.
pub struct RunContext {
    pub seed: u64,
    pub rng: ChaCha8Rng,
    pub engine: Questline<StaticDataLoader, MemoryStore>,
    pub sweep_samples: usize,
}

impl RunContext {
    pub fn new(seed: u64) -> Result<Self> {
        Ok(Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            engine: Questline::new(StaticDataLoader, MemoryStore::new())?,
            sweep_samples: DEFAULT_SWEEP_SAMPLES,
        })
    }
}

pub type Expectation = fn(&mut RunContext) -> Result<()>;

#[derive(Clone, Default)]
pub struct ScenarioPlan {
    pub expectations: Vec<Expectation>,
}

impl ScenarioPlan {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

#[derive(Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub plan: ScenarioPlan,
}

impl TestScenario {
    #[must_use]
    pub const fn new(key: &'static str, name: &'static str, plan: ScenarioPlan) -> Self {
        Self { key, name, plan }
    }
}

fn smoke_scenario() -> TestScenario {
    TestScenario::new(
        "smoke",
        "Smoke Test",
        ScenarioPlan::new()
            .with_expectation(catalog::not_started_lands_on_welcome)
            .with_expectation(catalog::signed_in_finished_user_stays)
            .with_expectation(walkthrough::walkthrough_expectation),
    )
}

pub fn get_scenario(name: &str) -> Option<TestScenario> {
    match name.to_lowercase().as_str() {
        "smoke" => Some(smoke_scenario()),
        "walkthrough" | "onboarding" => Some(walkthrough::walkthrough_scenario()),
        "a" => find_catalog_scenario("welcome-entry"),
        "b" => find_catalog_scenario("pending-quest"),
        "c" => find_catalog_scenario("first-quest-result"),
        "d" => find_catalog_scenario("app-stay"),
        "e" => find_catalog_scenario("session-gate"),
        "f" => find_catalog_scenario("branch-exclusion"),
        other => find_catalog_scenario(other),
    }
}

/// Every scenario key `all` expands to, in run order.
pub fn all_scenario_keys() -> Vec<&'static str> {
    let mut keys = vec!["smoke"];
    keys.extend(catalog_scenarios().iter().map(|scenario| scenario.key));
    keys.push("walkthrough");
    keys
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    let mut entries = vec![("smoke", "Smoke Test")];
    entries.extend(
        catalog_scenarios()
            .iter()
            .map(|scenario| (scenario.key, scenario.name)),
    );
    entries.push(("walkthrough", "Randomized Onboarding Walkthrough"));
    entries
}
