use std::sync::Arc;

use tracing::{info, warn};

use uk_core::ports::{ClockPort, HistoryServicePort};
use uk_core::session::SessionMarker;
use uk_core::{Identifier, UserAccount, UserId};

use crate::state::{HistoryState, LocalState};
use crate::usecases::reconcile::RestoreBackup;

/// Resolution failures: only the local store going unreadable fails a
/// login; backup and history availability never do.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("local account state unreadable: {0}")]
    Store(#[from] anyhow::Error),
}

pub struct ResolveAccount {
    local: Arc<LocalState>,
    history: Arc<HistoryState>,
    history_service: Arc<dyn HistoryServicePort>,
    restore: Arc<RestoreBackup>,
    clock: Arc<dyn ClockPort>,
}

impl ResolveAccount {
    pub fn new(
        local: Arc<LocalState>,
        history: Arc<HistoryState>,
        history_service: Arc<dyn HistoryServicePort>,
        restore: Arc<RestoreBackup>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            local,
            history,
            history_service,
            restore,
            clock,
        }
    }

    /// Resolve the verified identifier against local state and conclude
    /// with a persisted `{ identifier, is_verified }` session marker.
    pub async fn execute(
        &self,
        identifier: &Identifier,
        provider_user_id: Option<String>,
    ) -> Result<UserAccount, ResolveError> {
        let existing = self.local.account().await?;

        let account = match existing {
            Some(account) if account.matches_identifier(identifier) => {
                self.returning_account(account).await?
            }
            stale => self.new_account(identifier, provider_user_id, stale).await?,
        };

        self.local
            .save_session_marker(&SessionMarker {
                identifier: identifier.clone(),
                is_verified: true,
            })
            .await?;

        Ok(account)
    }

    /// New-account path: replace whatever a previous identity left behind,
    /// then try to adopt a prior backup for the resolved user id.
    ///
    /// Idempotent: a rerun after a partial failure rebuilds the same
    /// account for the identifier instead of stacking a second one.
    async fn new_account(
        &self,
        identifier: &Identifier,
        provider_user_id: Option<String>,
        stale: Option<UserAccount>,
    ) -> Result<UserAccount, ResolveError> {
        if let Some(old) = stale {
            info!(user_id = %old.user_id, "discarding local account left by a previous identity");
        }

        // Flags from a previous identity never leak into the new one.
        // Device preferences stay; they belong to the device, not the user.
        let mut settings = self.local.settings().await?;
        settings.has_consented = None;
        settings.streak_days = 0;
        self.local.save_settings(&settings).await?;
        self.history.clear().await;

        let user_id = provider_user_id
            .map(UserId::new)
            .unwrap_or_else(UserId::generate);
        let mut account = UserAccount::new(user_id, identifier.clone(), self.clock.now());
        self.local.save_account(&account).await?;

        // Best-effort adoption of a prior backup. Login proceeds as a
        // fresh account when the store is unavailable.
        match self.restore.execute(&mut account).await {
            Ok(()) => {
                self.local.save_account(&account).await?;
            }
            Err(err) => {
                warn!(user_id = %account.user_id, error = %err, "backup restore failed, continuing without prior data");
            }
        }

        Ok(account)
    }

    /// Returning-account path: never recreate. Profile completion is
    /// recomputed defensively: the stored flag, or a non-empty history for
    /// the identifier, counts as complete. History existing is accepted as
    /// strong evidence of a previously completed profile even when the
    /// flag was never persisted correctly.
    async fn returning_account(
        &self,
        mut account: UserAccount,
    ) -> Result<UserAccount, ResolveError> {
        let mut settings = self.local.settings().await?;

        match self.history_service.get_history(&account.email).await {
            Ok(entries) => {
                let has_history = !entries.is_empty();
                self.history.replace(entries).await;
                if has_history && !account.has_completed_profile {
                    info!(user_id = %account.user_id, "non-empty history implies completed profile, repairing flags");
                    account.has_completed_profile = true;
                    settings.has_consented = Some(true);
                }
            }
            Err(err) => {
                warn!(user_id = %account.user_id, error = %err, "history service unreachable, keeping stored completion flag");
            }
        }

        // Consent is left untouched once set; only an absent flag is
        // defaulted to "not granted".
        if settings.has_consented.is_none() {
            settings.has_consented = Some(false);
        }

        self.local.save_settings(&settings).await?;
        self.local.save_account(&account).await?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::testing::{
        map_store, FixedClock, MockBackupStore, MockHistoryService,
    };
    use chrono::Utc;
    use serde_json::json;
    use uk_core::backup::BackupDomain;
    use uk_core::history::{AnalysisEntry, MediaKind};
    use uk_core::ports::BackupStorePort;

    struct Fixture {
        resolve: ResolveAccount,
        local: Arc<LocalState>,
        history: Arc<HistoryState>,
        backup_store: Arc<MockBackupStore>,
        history_service: Arc<MockHistoryService>,
    }

    fn fixture_with(history_service: MockHistoryService) -> Fixture {
        let local = Arc::new(LocalState::new(map_store()));
        let history = Arc::new(HistoryState::new());
        let backup_store = Arc::new(MockBackupStore::default());
        let history_service = Arc::new(history_service);
        let restore = Arc::new(RestoreBackup::new(
            Arc::clone(&backup_store) as Arc<dyn BackupStorePort>,
            Arc::clone(&local),
            Arc::clone(&history),
        ));
        let resolve = ResolveAccount::new(
            Arc::clone(&local),
            Arc::clone(&history),
            Arc::clone(&history_service) as Arc<dyn HistoryServicePort>,
            restore,
            Arc::new(FixedClock::default()),
        );
        Fixture {
            resolve,
            local,
            history,
            backup_store,
            history_service,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockHistoryService::default())
    }

    fn entry(id: &str) -> AnalysisEntry {
        AnalysisEntry {
            id: id.into(),
            kind: MediaKind::Image,
            captured_at: Utc::now(),
            media: Default::default(),
            nutrition: Default::default(),
            job_id: None,
        }
    }

    #[tokio::test]
    async fn new_user_without_backup_gets_a_blank_account() {
        let f = fixture();

        let account = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert!(!account.has_completed_profile);
        assert!(f.history.is_empty().await);
        let marker = f.local.session_marker().await.unwrap().unwrap();
        assert_eq!(marker.identifier.as_str(), "a@x.com");
        assert!(marker.is_verified);
    }

    #[tokio::test]
    async fn provider_issued_id_is_adopted() {
        let f = fixture();

        let account = f
            .resolve
            .execute(&Identifier::from("a@x.com"), Some("stable-7".into()))
            .await
            .unwrap();

        assert_eq!(account.user_id, UserId::new("stable-7"));
    }

    #[tokio::test]
    async fn new_user_with_backup_restores_prior_data() {
        let f = fixture();
        f.backup_store.seed(
            &UserId::new("stable-7"),
            BackupDomain::Profile,
            json!({ "has_completed_profile": true }),
        );
        f.backup_store.seed(
            &UserId::new("stable-7"),
            BackupDomain::History,
            json!([
                { "id": "h1", "kind": "image", "captured_at": "2026-03-01T08:00:00Z" },
                { "id": "h2", "kind": "video", "captured_at": "2026-03-02T08:00:00Z" },
                { "id": "h3", "kind": "image", "captured_at": "2026-03-03T08:00:00Z" },
            ]),
        );

        let account = f
            .resolve
            .execute(&Identifier::from("a@x.com"), Some("stable-7".into()))
            .await
            .unwrap();

        assert!(account.has_completed_profile);
        assert_eq!(f.history.len().await, 3);
        // The restored flags are persisted, not just in memory.
        assert!(f.local.account().await.unwrap().unwrap().has_completed_profile);
    }

    #[tokio::test]
    async fn backup_outage_still_logs_the_user_in() {
        let f = fixture();
        f.backup_store.fail_reads();

        let account = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert!(!account.has_completed_profile);
        assert!(f.local.session_marker().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn identifier_change_replaces_the_local_account() {
        let f = fixture();
        let first = f
            .resolve
            .execute(&Identifier::from("old@x.com"), None)
            .await
            .unwrap();
        let mut settings = f.local.settings().await.unwrap();
        settings.has_consented = Some(true);
        settings.streak_days = 12;
        f.local.save_settings(&settings).await.unwrap();

        let second = f
            .resolve
            .execute(&Identifier::from("new@x.com"), None)
            .await
            .unwrap();

        assert_ne!(first.user_id, second.user_id);
        let stored = f.local.account().await.unwrap().unwrap();
        assert_eq!(stored.email.as_str(), "new@x.com");
        // Stale identity flags were cleared before the fresh account landed.
        let settings = f.local.settings().await.unwrap();
        assert_eq!(settings.has_consented, None);
        assert_eq!(settings.streak_days, 0);
    }

    #[tokio::test]
    async fn returning_user_is_not_recreated() {
        let f = fixture();
        let first = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();
        let reads_after_first = f.backup_store.reads();

        let second = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert_eq!(first.user_id, second.user_id);
        // The reconciliation pull only runs on the new-account path.
        assert_eq!(f.backup_store.reads(), reads_after_first);
    }

    #[tokio::test]
    async fn history_repairs_a_lost_completion_flag() {
        let f = fixture_with(MockHistoryService::with_entries(vec![entry("h1")]));
        f.resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();
        // Simulate the flag-loss bug: account exists, flag never stuck.
        let mut account = f.local.account().await.unwrap().unwrap();
        account.has_completed_profile = false;
        f.local.save_account(&account).await.unwrap();

        let resolved = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert!(resolved.has_completed_profile);
        assert_eq!(f.local.settings().await.unwrap().has_consented, Some(true));
    }

    #[tokio::test]
    async fn unreachable_history_falls_back_to_the_stored_flag() {
        let f = fixture();
        f.resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();
        f.history_service.make_unreachable();

        let resolved = f
            .resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert!(!resolved.has_completed_profile);
        assert!(f.local.session_marker().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn returning_user_consent_defaults_to_not_granted_only_when_absent() {
        let f = fixture();
        f.resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();
        let mut settings = f.local.settings().await.unwrap();
        settings.has_consented = Some(true);
        f.local.save_settings(&settings).await.unwrap();

        f.resolve
            .execute(&Identifier::from("a@x.com"), None)
            .await
            .unwrap();

        assert_eq!(f.local.settings().await.unwrap().has_consented, Some(true));
    }
}
