pub mod reports;
pub mod seeds;
pub mod sweep;
pub mod tester;

pub use seeds::resolve_seed_inputs;
pub use tester::{LogicTester, ScenarioResult};
