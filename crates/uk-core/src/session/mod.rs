//! Session domain: the externally observable authentication lifecycle.

pub mod state_machine;

pub use state_machine::{SessionAction, SessionEvent, SessionState, SessionStateMachine};

use serde::{Deserialize, Serialize};

use crate::account::Identifier;

/// Failure reason carried by the `Anonymous` state after an aborted
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum SessionError {
    #[error("code delivery failed: {0}")]
    CodeSend(String),
    #[error("code verification failed: {0}")]
    Verification(String),
    #[error("account resolution failed: {0}")]
    AccountResolution(String),
    #[error("account deletion failed: {0}")]
    Deletion(String),
}

/// Observable projection consumed by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identifier: Option<Identifier>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub last_error: Option<String>,
}

/// Persisted logged-in marker.
///
/// The session is rebuilt from this at process start, never from the
/// backup store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMarker {
    pub identifier: Identifier,
    pub is_verified: bool,
}
