//! In-memory history list for the running session.
//!
//! Hydrated from the history service (or a restored backup) after login,
//! mutated by history use cases, and pushed to the backup store on change.
//! Never persisted locally, so a stale list cannot survive a restart.

use tokio::sync::RwLock;

use uk_core::history::{AnalysisEntry, HistoryList};

#[derive(Default)]
pub struct HistoryState {
    list: RwLock<HistoryList>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list (fresh fetch or restored backup).
    pub async fn replace(&self, entries: Vec<AnalysisEntry>) {
        self.list.write().await.replace_all(entries);
    }

    pub async fn prepend(&self, entry: AnalysisEntry) {
        self.list.write().await.prepend(entry);
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.list.write().await.remove(id)
    }

    pub async fn clear(&self) {
        self.list.write().await.replace_all(Vec::new());
    }

    /// Owned copy of the current list, newest first.
    pub async fn snapshot(&self) -> Vec<AnalysisEntry> {
        self.list.read().await.entries().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.list.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.list.read().await.is_empty()
    }
}
