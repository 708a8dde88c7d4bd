//! Loading the static quest graph and configuration.
use serde::de::DeserializeOwned;

use crate::quest::{GraphError, QuestGraph};

const BUNDLED_QUESTS: &str = include_str!("../assets/data/quests.json");
const BUNDLED_NAVIGATOR: &str = include_str!("../assets/data/navigator.json");

pub const NAVIGATOR_CONFIG: &str = "navigator";

/// Trait for abstracting data loading operations.
/// Platform-specific implementations fetch from their own asset source.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the quest graph.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph cannot be loaded or is structurally invalid.
    fn load_quest_graph(&self) -> Result<QuestGraph, Self::Error>;

    /// Load configuration data by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned;
}

#[derive(Debug, thiserror::Error)]
pub enum StaticDataError {
    #[error("no bundled configuration named {0}")]
    UnknownConfig(String),
    #[error("bundled configuration {name} is malformed")]
    Config {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("bundled quest graph is invalid")]
    Graph(#[from] GraphError),
}

/// Loader serving the JSON assets compiled into the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticDataLoader;

impl StaticDataLoader {
    #[must_use]
    pub const fn bundled_quests() -> &'static str {
        BUNDLED_QUESTS
    }
}

impl DataLoader for StaticDataLoader {
    type Error = StaticDataError;

    fn load_quest_graph(&self) -> Result<QuestGraph, Self::Error> {
        Ok(QuestGraph::from_json(BUNDLED_QUESTS)?)
    }

    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: DeserializeOwned,
    {
        let raw = match config_name {
            NAVIGATOR_CONFIG => BUNDLED_NAVIGATOR,
            other => return Err(StaticDataError::UnknownConfig(other.to_string())),
        };
        serde_json::from_str(raw).map_err(|source| StaticDataError::Config {
            name: config_name.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigatorConfig;
    use crate::quest::QuestId;

    #[test]
    fn bundled_graph_is_valid() {
        let graph = StaticDataLoader.load_quest_graph().unwrap();
        assert_eq!(graph.roots(), [QuestId::from("quest-1")].as_slice());
        assert!(graph.len() >= 4);
        assert!(graph.iter().any(|node| node.is_terminal()));
    }

    #[test]
    fn bundled_navigator_config_matches_defaults() {
        let cfg: NavigatorConfig = StaticDataLoader.load_config(NAVIGATOR_CONFIG).unwrap();
        assert_eq!(cfg, NavigatorConfig::default_config());
    }

    #[test]
    fn unknown_config_is_an_error() {
        let err = StaticDataLoader
            .load_config::<NavigatorConfig>("weather")
            .unwrap_err();
        assert!(matches!(err, StaticDataError::UnknownConfig(name) if name == "weather"));
    }
}
