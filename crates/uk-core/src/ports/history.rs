//! History domain service port
//!
//! The backend history service keyed by the authenticated identifier.
//! Consulted after login instead of any local snapshot, and used
//! defensively during account resolution to infer profile completion.

use async_trait::async_trait;

use crate::account::Identifier;
use crate::history::AnalysisEntry;

#[async_trait]
pub trait HistoryServicePort: Send + Sync {
    /// Fetch the user's analysis history, newest first.
    async fn get_history(&self, identifier: &Identifier) -> anyhow::Result<Vec<AnalysisEntry>>;
}
