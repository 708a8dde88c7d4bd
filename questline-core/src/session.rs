//! Session status as published by the external session provider.
use serde::{Deserialize, Serialize};

use crate::changes::{ChangeQueue, ChangeSource};

/// Authentication status of the current user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    #[default]
    Idle,
    /// Restoring a persisted session; snapshots taken now are incomplete.
    Hydrating,
    SignedOut,
    SignedIn,
}

impl SessionStatus {
    pub const ALL: &'static [Self] = &[Self::Idle, Self::Hydrating, Self::SignedOut, Self::SignedIn];

    #[must_use]
    pub const fn is_signed_in(self) -> bool {
        matches!(self, Self::SignedIn)
    }

    #[must_use]
    pub const fn is_transitional(self) -> bool {
        matches!(self, Self::Hydrating)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Hydrating => "hydrating",
            Self::SignedOut => "signedOut",
            Self::SignedIn => "signedIn",
        }
    }
}

/// Read side of the session provider, mirrored into the core.
#[derive(Debug, Clone, Default)]
pub struct Session {
    status: SessionStatus,
    changes: ChangeQueue,
}

impl Session {
    #[must_use]
    pub fn new(changes: ChangeQueue) -> Self {
        Self {
            status: SessionStatus::default(),
            changes,
        }
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Mirror a status published by the provider. Returns whether it changed.
    pub fn set_status(&mut self, status: SessionStatus) -> bool {
        if self.status == status {
            return false;
        }
        log::debug!("session status {} -> {}", self.status.key(), status.key());
        self.status = status;
        self.changes.mark(ChangeSource::Session);
        true
    }
}
