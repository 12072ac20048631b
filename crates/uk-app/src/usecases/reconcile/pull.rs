use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use uk_core::backup::{BackupDomain, ProfileBackup};
use uk_core::history::AnalysisEntry;
use uk_core::ports::BackupStorePort;
use uk_core::settings::SettingsBackup;
use uk_core::UserAccount;

use crate::state::{HistoryState, LocalState};

use super::BackupError;

/// Restore a prior backup into freshly created local state.
///
/// Invoked only on the new-account path, where the local history list is
/// empty by construction, so the history domain is a wholesale replace
/// rather than a merge. Re-running against the same backup converges to
/// the same local state.
pub struct RestoreBackup {
    backup_store: Arc<dyn BackupStorePort>,
    local: Arc<LocalState>,
    history: Arc<HistoryState>,
}

impl RestoreBackup {
    pub fn new(
        backup_store: Arc<dyn BackupStorePort>,
        local: Arc<LocalState>,
        history: Arc<HistoryState>,
    ) -> Self {
        Self {
            backup_store,
            local,
            history,
        }
    }

    /// Pull all domains for the account's user id and apply whatever is
    /// present. Mutates `account` in place; the caller persists it.
    pub async fn execute(&self, account: &mut UserAccount) -> Result<(), BackupError> {
        let snapshots = self
            .backup_store
            .read_all_domains(&account.user_id)
            .await
            .map_err(BackupError::Pull)?;

        if snapshots.is_empty() {
            debug!(user_id = %account.user_id, "no prior backup found");
            return Ok(());
        }

        // Domains apply independently: a malformed one is skipped, the
        // others still land.
        if let Some(profile) =
            snapshots.profile.and_then(|v| decode::<ProfileBackup>(BackupDomain::Profile, v))
        {
            account.has_completed_profile = profile.has_completed_profile;
            account.profile = profile.profile;
            account.avatar = profile.avatar;
        }

        if let Some(entries) =
            snapshots.history.and_then(|v| decode::<Vec<AnalysisEntry>>(BackupDomain::History, v))
        {
            info!(user_id = %account.user_id, entries = entries.len(), "restoring history from backup");
            self.history.replace(entries).await;
        }

        if let Some(backup) =
            snapshots.settings.and_then(|v| decode::<SettingsBackup>(BackupDomain::Settings, v))
        {
            let mut settings = self.local.settings().await.map_err(BackupError::Pull)?;
            // Flags apply only when the backup carries a concrete value.
            if let Some(consented) = backup.has_consented {
                settings.has_consented = Some(consented);
            }
            if let Some(completed) = backup.has_completed_profile {
                account.has_completed_profile = completed;
            }
            settings.preferences = backup.preferences;
            settings.streak_days = backup.streak_days;
            self.local
                .save_settings(&settings)
                .await
                .map_err(BackupError::Pull)?;
        }

        Ok(())
    }
}

fn decode<T: DeserializeOwned>(domain: BackupDomain, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(domain = %domain, error = %err, "malformed backup domain skipped");
            None
        }
    }
}
