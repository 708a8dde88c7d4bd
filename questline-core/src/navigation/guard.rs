//! Reactive adapter applying resolver redirects through a router.
use std::convert::Infallible;

use super::resolver::{Destination, Navigator, Rule};
use crate::changes::{ChangeQueue, ChangeSource};
use crate::config::NavigatorConfig;
use crate::state::AppState;

/// The slice of a platform router the guard needs.
pub trait Router {
    type Error: std::error::Error + Send + Sync + 'static;

    fn current_path(&self) -> &str;

    /// Replace the current history entry.
    ///
    /// # Errors
    ///
    /// Returns the router's own error; the guard does not recover from it.
    fn replace(&mut self, destination: &Destination) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError<E: std::error::Error + 'static> {
    #[error("router failed to replace the current route with {path}")]
    Router {
        path: String,
        #[source]
        source: E,
    },
    #[error("redirect chain exceeded {limit} hops at {path}")]
    RedirectLoop { limit: usize, path: String },
}

/// A replace navigation issued by the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub rule: Rule,
    pub from: String,
    pub to: Destination,
}

/// Re-runs the resolver whenever the route or any state container changes.
///
/// Notifications accumulate on the shared [`ChangeQueue`]; [`flush`] drains
/// them and performs one resolver pass, following redirects until the
/// resolver accepts the current path.
///
/// [`flush`]: NavigationGuard::flush
#[derive(Debug)]
pub struct NavigationGuard<R> {
    router: R,
    navigator: Navigator,
    changes: ChangeQueue,
    enabled: bool,
    max_chain: usize,
}

impl<R: Router> NavigationGuard<R> {
    #[must_use]
    pub fn new(router: R, navigator: Navigator, changes: ChangeQueue, max_chain: usize) -> Self {
        changes.mark(ChangeSource::Route);
        Self {
            router,
            navigator,
            changes,
            enabled: true,
            max_chain,
        }
    }

    /// Guard listening to the containers of `state`.
    #[must_use]
    pub fn attach(router: R, state: &AppState, config: &NavigatorConfig) -> Self {
        Self::new(
            router,
            Navigator::from_config(config),
            state.changes().clone(),
            config.max_redirect_chain,
        )
    }

    #[must_use]
    pub const fn router(&self) -> &R {
        &self.router
    }

    /// Mutable router access for user-driven navigation; call
    /// [`NavigationGuard::route_changed`] afterwards.
    pub const fn router_mut(&mut self) -> &mut R {
        &mut self.router
    }

    #[must_use]
    pub const fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Record that `source` changed; evaluated on the next flush.
    pub fn notify(&self, source: ChangeSource) {
        self.changes.mark(source);
    }

    pub fn route_changed(&self) {
        self.notify(ChangeSource::Route);
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pause or resume evaluation. Notifications received while paused are
    /// kept and evaluated on the next flush after resuming.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.changes.mark(ChangeSource::Route);
        }
        self.enabled = enabled;
    }

    /// Evaluate pending notifications against `state`.
    ///
    /// # Errors
    ///
    /// Propagates router failures and aborts when the redirect chain exceeds
    /// the configured cap.
    pub fn flush(&mut self, state: &AppState) -> Result<Vec<Redirect>, NavigationError<R::Error>> {
        if !self.enabled || self.changes.is_empty() {
            return Ok(Vec::new());
        }
        let sources = self.changes.drain();
        log::trace!("navigation guard flush for {sources:?}");

        let mut redirects = Vec::new();
        loop {
            let from = self.router.current_path().to_string();
            let Some(decision) = self.navigator.explain(&state.snapshot(&from)) else {
                break;
            };
            let Some(to) = decision.destination else {
                break;
            };
            if redirects.len() >= self.max_chain {
                log::warn!(
                    "aborting redirect chain after {} hops at {from}",
                    redirects.len()
                );
                // Unsettled; the next flush must evaluate again.
                self.changes.mark(ChangeSource::Route);
                return Err(NavigationError::RedirectLoop {
                    limit: self.max_chain,
                    path: from,
                });
            }
            if let Err(source) = self.router.replace(&to) {
                self.changes.mark(ChangeSource::Route);
                return Err(NavigationError::Router {
                    path: to.target_path,
                    source,
                });
            }
            log::info!("redirected {from} -> {} ({:?})", to.href(), decision.rule);
            redirects.push(Redirect {
                rule: decision.rule,
                from,
                to,
            });
        }
        Ok(redirects)
    }
}

/// In-memory router keeping a history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRouter {
    history: Vec<String>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::new(super::paths::ROOT)
    }
}

impl MemoryRouter {
    #[must_use]
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: vec![initial.into()],
        }
    }

    /// User navigation: push a new history entry.
    pub fn push(&mut self, path: impl Into<String>) {
        self.history.push(path.into());
    }

    /// Pop the current entry, keeping at least one.
    pub fn back(&mut self) -> Option<String> {
        if self.history.len() > 1 {
            self.history.pop()
        } else {
            None
        }
    }

    #[must_use]
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Router for MemoryRouter {
    type Error = Infallible;

    fn current_path(&self) -> &str {
        self.history.last().map_or(super::paths::ROOT, String::as_str)
    }

    fn replace(&mut self, destination: &Destination) -> Result<(), Self::Error> {
        let href = destination.href();
        match self.history.last_mut() {
            Some(current) => *current = href,
            None => self.history.push(href),
        }
        Ok(())
    }
}
