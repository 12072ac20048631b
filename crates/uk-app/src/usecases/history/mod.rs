//! History use cases.
//!
//! The list lives in memory only; mutations schedule a background push of
//! the history domain so a reinstall can restore it.

use std::sync::Arc;

use uk_core::backup::BackupDomain;
use uk_core::history::AnalysisEntry;

use crate::state::HistoryState;
use crate::usecases::reconcile::TriggerBackup;

/// Record a freshly analysed capture at the head of the list.
pub struct AddAnalysisEntry {
    history: Arc<HistoryState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl AddAnalysisEntry {
    pub fn new(history: Arc<HistoryState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            history,
            trigger_backup,
        }
    }

    pub async fn execute(&self, entry: AnalysisEntry) {
        self.history.prepend(entry).await;
        self.trigger_backup.spawn(BackupDomain::History);
    }
}

/// Delete one entry by id.
pub struct DeleteAnalysisEntry {
    history: Arc<HistoryState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl DeleteAnalysisEntry {
    pub fn new(history: Arc<HistoryState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            history,
            trigger_backup,
        }
    }

    pub async fn execute(&self, id: &str) -> bool {
        let removed = self.history.remove(id).await;
        if removed {
            self.trigger_backup.spawn(BackupDomain::History);
        }
        removed
    }
}
