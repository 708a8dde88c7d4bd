//! Change notification shared by the state containers and the router.
//!
//! Every container that the navigation resolver reads marks its source on the
//! queue when it actually mutates. The navigation guard drains the queue and
//! runs a single resolver pass no matter how many marks accumulated, so a burst
//! of mutations inside one event handler never fires the resolver twice.
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

/// Which input of the resolver changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeSource {
    Route,
    Session,
    Progression,
    QuestLifecycle,
}

/// Single-threaded set of pending change notifications.
///
/// Clones share the same underlying set.
#[derive(Debug, Clone, Default)]
pub struct ChangeQueue {
    pending: Rc<RefCell<BTreeSet<ChangeSource>>>,
}

impl ChangeQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self, source: ChangeSource) {
        self.pending.borrow_mut().insert(source);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }

    #[must_use]
    pub fn contains(&self, source: ChangeSource) -> bool {
        self.pending.borrow().contains(&source)
    }

    /// Take every pending notification, leaving the queue empty.
    pub fn drain(&self) -> BTreeSet<ChangeSource> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Whether both handles point at the same queue.
    #[must_use]
    pub fn shares_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.pending, &other.pending)
    }
}
