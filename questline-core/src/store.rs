//! Persistence of funnel progress and the completion log.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::funnel::FunnelStep;
use crate::quest::CompletedQuestRecord;
use crate::state::AppState;

pub const FUNNEL_STEP_KEY: &str = "funnel_step";
pub const COMPLETED_QUESTS_KEY: &str = "completed_quests";

/// Trait for abstracting the platform key-value store
/// (local storage, a settings file, a database row).
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

/// Shared in-memory store; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = Infallible;

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistError<E: std::error::Error + 'static> {
    #[error("storage backend failed")]
    Backend(#[source] E),
    #[error("stored value under {key} is malformed")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode value for {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Namespaced JSON persistence of the funnel step and completion log.
#[derive(Debug, Clone)]
pub struct ProgressStore<S> {
    store: S,
    namespace: String,
}

impl<S: KeyValueStore> ProgressStore<S> {
    #[must_use]
    pub fn new(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn key(&self, name: &str) -> String {
        format!("{}.{name}", self.namespace)
    }

    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn save_step(&self, step: FunnelStep) -> Result<(), PersistError<S::Error>> {
        self.write(FUNNEL_STEP_KEY, &step)
    }

    /// Stored step, or `None` when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend read fails or the value is malformed.
    pub fn load_step(&self) -> Result<Option<FunnelStep>, PersistError<S::Error>> {
        self.read(FUNNEL_STEP_KEY)
    }

    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    pub fn save_history(
        &self,
        history: &[CompletedQuestRecord],
    ) -> Result<(), PersistError<S::Error>> {
        self.write(COMPLETED_QUESTS_KEY, &history)
    }

    /// # Errors
    ///
    /// Returns an error if the backend read fails or the value is malformed.
    pub fn load_history(&self) -> Result<Vec<CompletedQuestRecord>, PersistError<S::Error>> {
        Ok(self.read(COMPLETED_QUESTS_KEY)?.unwrap_or_default())
    }

    /// Persist the durable parts of `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn save(&self, state: &AppState) -> Result<(), PersistError<S::Error>> {
        self.save_step(state.progression().current_step())?;
        self.save_history(state.quests().completed_quests())
    }

    /// Fresh containers holding whatever progress was stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored values cannot be read.
    pub fn restore(&self) -> Result<AppState, PersistError<S::Error>> {
        let step = self.load_step()?.unwrap_or(FunnelStep::INITIAL);
        let history = self.load_history()?;
        log::debug!(
            "restored funnel step {step} with {} completion records",
            history.len()
        );
        Ok(AppState::restored(step, history))
    }

    /// # Errors
    ///
    /// Returns an error if the backend refuses the removal.
    pub fn clear(&self) -> Result<(), PersistError<S::Error>> {
        for name in [FUNNEL_STEP_KEY, COMPLETED_QUESTS_KEY] {
            self.store
                .remove(&self.key(name))
                .map_err(PersistError::Backend)?;
        }
        Ok(())
    }

    fn write<T: Serialize + ?Sized>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<(), PersistError<S::Error>> {
        let key = self.key(name);
        let encoded = serde_json::to_string(value).map_err(|source| PersistError::Encode {
            key: key.clone(),
            source,
        })?;
        self.store.set(&key, &encoded).map_err(PersistError::Backend)
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, PersistError<S::Error>> {
        let key = self.key(name);
        let Some(raw) = self.store.get(&key).map_err(PersistError::Backend)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistError::Malformed { key, source })
    }
}
