//! Cold-start rehydration of persisted application state.
//!
//! Applied exactly once after the local store is loaded, before the rest
//! of the application observes state: transient display flags are forced
//! back to their cold-start values; durable fields pass through unchanged.
//! History is never part of the persisted snapshot; it is re-fetched from
//! the history service per authenticated identifier.

use serde::{Deserialize, Serialize};

use crate::account::UserAccount;
use crate::session::SessionMarker;
use crate::settings::AppSettings;

/// Transient display flags, persisted only as an artefact of snapshotting
/// whole state slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub show_splash: bool,
    pub resume_onboarding: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        // Cold start always shows the splash and never resumes a
        // mid-flight onboarding screen.
        Self {
            show_splash: true,
            resume_onboarding: false,
        }
    }
}

/// Everything the local store holds for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedAppState {
    pub account: Option<UserAccount>,
    pub session: Option<SessionMarker>,
    #[serde(default)]
    pub settings: AppSettings,
    #[serde(default)]
    pub display: DisplayState,
}

impl PersistedAppState {
    /// Rehydration transform: reset transient display flags regardless of
    /// what was persisted.
    pub fn rehydrate(mut self) -> Self {
        #[cfg(feature = "tracing")]
        if self.display != DisplayState::default() {
            tracing::debug!(display = ?self.display, "resetting transient display flags");
        }
        self.display = DisplayState::default();
        self
    }
}
