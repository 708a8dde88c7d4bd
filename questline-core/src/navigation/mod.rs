//! Navigation gating: path classification, the redirect resolver, and the
//! guard that applies its decisions to a router.
pub mod guard;
pub mod paths;
pub mod resolver;

pub use guard::{MemoryRouter, NavigationError, NavigationGuard, Redirect, Router};
pub use paths::Screen;
pub use resolver::{
    Decision, Destination, NavigationSnapshot, Navigator, OUTCOME_PARAM, QUEST_ID_PARAM, Rule,
    decide,
};
