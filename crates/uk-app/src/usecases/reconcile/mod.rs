//! Reconciliation between local state and the remote backup store.
//!
//! Pull runs once, on the new-account path; pushes run after any
//! state-changing event. Both are best-effort: their failures are logged
//! and never surface into the action that triggered them.

mod pull;
mod push;

pub use pull::RestoreBackup;
pub use push::{PushBackup, TriggerBackup};

/// Reconciliation failures. Absorbed by callers, never user-visible.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error("backup pull failed: {0}")]
    Pull(#[source] anyhow::Error),
    #[error("backup push failed: {0}")]
    Push(#[source] anyhow::Error),
}
