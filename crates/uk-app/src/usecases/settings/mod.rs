//! Settings use cases.
//!
//! Each mutation persists the settings slice and schedules a background
//! push of the settings domain snapshot.

use std::sync::Arc;

use uk_core::backup::BackupDomain;
use uk_core::settings::{AppSettings, Preferences};

use crate::state::LocalState;
use crate::usecases::reconcile::TriggerBackup;

/// Record the user's consent decision.
pub struct SetConsent {
    local: Arc<LocalState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl SetConsent {
    pub fn new(local: Arc<LocalState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            local,
            trigger_backup,
        }
    }

    pub async fn execute(&self, granted: bool) -> anyhow::Result<AppSettings> {
        let mut settings = self.local.settings().await?;
        settings.has_consented = Some(granted);
        self.local.save_settings(&settings).await?;
        self.trigger_backup.spawn(BackupDomain::Settings);
        Ok(settings)
    }
}

/// Replace the device-dependent preferences.
pub struct UpdatePreferences {
    local: Arc<LocalState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl UpdatePreferences {
    pub fn new(local: Arc<LocalState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            local,
            trigger_backup,
        }
    }

    pub async fn execute(&self, preferences: Preferences) -> anyhow::Result<AppSettings> {
        let mut settings = self.local.settings().await?;
        settings.preferences = preferences;
        self.local.save_settings(&settings).await?;
        self.trigger_backup.spawn(BackupDomain::Settings);
        Ok(settings)
    }
}

/// Bump the activity streak counter.
pub struct RecordStreakDay {
    local: Arc<LocalState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl RecordStreakDay {
    pub fn new(local: Arc<LocalState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            local,
            trigger_backup,
        }
    }

    pub async fn execute(&self) -> anyhow::Result<AppSettings> {
        let mut settings = self.local.settings().await?;
        settings.streak_days = settings.streak_days.saturating_add(1);
        self.local.save_settings(&settings).await?;
        self.trigger_backup.spawn(BackupDomain::Settings);
        Ok(settings)
    }
}
