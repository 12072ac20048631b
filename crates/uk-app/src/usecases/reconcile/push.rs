use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use uk_core::backup::{BackupDomain, ProfileBackup};
use uk_core::ports::{BackupStorePort, ClockPort};
use uk_core::settings::SettingsBackup;

use crate::state::{HistoryState, LocalState};

use super::BackupError;

/// Assemble and upload the current snapshot for one domain.
///
/// Every push carries a complete snapshot, so concurrent pushes racing is
/// acceptable under the store's last-write-wins semantics. No retry, no
/// backoff: the next state-changing event pushes a fresher snapshot anyway.
pub struct PushBackup {
    backup_store: Arc<dyn BackupStorePort>,
    local: Arc<LocalState>,
    history: Arc<HistoryState>,
    clock: Arc<dyn ClockPort>,
}

impl PushBackup {
    pub fn new(
        backup_store: Arc<dyn BackupStorePort>,
        local: Arc<LocalState>,
        history: Arc<HistoryState>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            backup_store,
            local,
            history,
            clock,
        }
    }

    pub async fn execute(&self, domain: BackupDomain) -> Result<(), BackupError> {
        let account = self.local.account().await.map_err(BackupError::Push)?;
        let Some(account) = account else {
            debug!(domain = %domain, "no local account, skipping push");
            return Ok(());
        };

        let payload = match domain {
            BackupDomain::Profile => serde_json::to_value(ProfileBackup {
                has_completed_profile: account.has_completed_profile,
                profile: account.profile.clone(),
                avatar: account.avatar.clone(),
            }),
            BackupDomain::History => serde_json::to_value(self.history.snapshot().await),
            BackupDomain::Settings => {
                let settings = self.local.settings().await.map_err(BackupError::Push)?;
                serde_json::to_value(SettingsBackup {
                    has_consented: settings.has_consented,
                    has_completed_profile: Some(account.has_completed_profile),
                    preferences: settings.preferences,
                    streak_days: settings.streak_days,
                    updated_at: self.clock.now(),
                })
            }
        }
        .context("encode backup snapshot")
        .map_err(BackupError::Push)?;

        self.backup_store
            .write_domain(&account.user_id, domain, payload)
            .await
            .map_err(BackupError::Push)?;

        debug!(user_id = %account.user_id, domain = %domain, "backup snapshot pushed");
        Ok(())
    }
}

/// Fire-and-forget scheduling of backup pushes.
///
/// Pushes are detached onto the runtime; failures are caught at the task
/// boundary and logged, never propagated into the triggering action.
pub struct TriggerBackup {
    push: Arc<PushBackup>,
}

impl TriggerBackup {
    pub fn new(push: Arc<PushBackup>) -> Self {
        Self { push }
    }

    /// Detach a push for one domain. The handle is returned for tests; a
    /// push outliving its triggering screen is expected and harmless.
    pub fn spawn(&self, domain: BackupDomain) -> tokio::task::JoinHandle<()> {
        let push = Arc::clone(&self.push);
        tokio::spawn(async move {
            if let Err(err) = push.execute(domain).await {
                warn!(domain = %domain, error = %err, "background backup push failed");
            }
        })
    }

    /// Detach pushes for every domain, e.g. right after login completes.
    pub fn spawn_all(&self) -> Vec<tokio::task::JoinHandle<()>> {
        BackupDomain::ALL
            .into_iter()
            .map(|domain| self.spawn(domain))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::testing::{map_store, FixedClock, MockBackupStore};
    use chrono::Utc;
    use uk_core::{Identifier, UserId};

    async fn seeded_local() -> Arc<LocalState> {
        let local = Arc::new(LocalState::new(map_store()));
        let account = uk_core::UserAccount::new(
            UserId::new("u-1"),
            Identifier::from("a@x.com"),
            Utc::now(),
        );
        local.save_account(&account).await.unwrap();
        local
    }

    fn push(store: Arc<MockBackupStore>, local: Arc<LocalState>) -> Arc<PushBackup> {
        Arc::new(PushBackup::new(
            store,
            local,
            Arc::new(HistoryState::new()),
            Arc::new(FixedClock::default()),
        ))
    }

    #[tokio::test]
    async fn push_skips_quietly_without_an_account() {
        let store = Arc::new(MockBackupStore::default());
        let local = Arc::new(LocalState::new(map_store()));

        push(Arc::clone(&store), local)
            .execute(BackupDomain::Settings)
            .await
            .unwrap();

        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn settings_push_carries_the_full_snapshot() {
        let store = Arc::new(MockBackupStore::default());
        let local = seeded_local().await;
        let mut settings = local.settings().await.unwrap();
        settings.has_consented = Some(true);
        settings.streak_days = 9;
        local.save_settings(&settings).await.unwrap();

        push(Arc::clone(&store), local)
            .execute(BackupDomain::Settings)
            .await
            .unwrap();

        let written = store
            .written(&UserId::new("u-1"), BackupDomain::Settings)
            .expect("settings snapshot written");
        assert_eq!(written["has_consented"], true);
        assert_eq!(written["streak_days"], 9);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_push_error() {
        let store = Arc::new(MockBackupStore::default());
        store.fail_writes();
        let local = seeded_local().await;

        let err = push(store, local)
            .execute(BackupDomain::Profile)
            .await
            .unwrap_err();

        assert!(matches!(err, BackupError::Push(_)));
    }

    #[tokio::test]
    async fn trigger_absorbs_push_failures() {
        let store = Arc::new(MockBackupStore::default());
        store.fail_writes();
        let local = seeded_local().await;
        let trigger = TriggerBackup::new(push(store, local));

        // The task must finish cleanly; the failure stays inside it.
        trigger.spawn(BackupDomain::Profile).await.unwrap();
    }
}
