//! Navigator configuration, loaded from `navigator.json` or defaulted.
use serde::{Deserialize, Serialize};

use crate::quest::QuestId;

pub const DEFAULT_FIRST_QUEST_ID: &str = "quest-1";
pub const DEFAULT_MAX_REDIRECT_CHAIN: usize = 4;
pub const DEFAULT_NAMESPACE: &str = "questline";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Quest whose outcome drives the onboarding result screen.
    pub first_quest_id: QuestId,
    /// Replace navigations a single guard flush may issue before giving up.
    pub max_redirect_chain: usize,
    /// Key prefix for persisted progress.
    pub namespace: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            first_quest_id: QuestId::from(DEFAULT_FIRST_QUEST_ID),
            max_redirect_chain: DEFAULT_MAX_REDIRECT_CHAIN,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl NavigatorConfig {
    #[must_use]
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Parse a configuration, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
