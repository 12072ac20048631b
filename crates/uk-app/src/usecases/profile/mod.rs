//! Profile use cases.
//!
//! Saves replace the whole record; field updates read the current record,
//! merge, and re-save. Every save is a state-changing event and schedules
//! a background push of the profile domain.

use std::sync::Arc;

use anyhow::Context;

use uk_core::account::{Avatar, ProfileUpdate};
use uk_core::backup::BackupDomain;
use uk_core::ports::ClockPort;
use uk_core::{BusinessProfile, UserAccount};

use crate::state::LocalState;
use crate::usecases::reconcile::TriggerBackup;

/// Replace the whole profile record and mark the profile complete.
pub struct SaveProfile {
    local: Arc<LocalState>,
    trigger_backup: Arc<TriggerBackup>,
}

impl SaveProfile {
    pub fn new(local: Arc<LocalState>, trigger_backup: Arc<TriggerBackup>) -> Self {
        Self {
            local,
            trigger_backup,
        }
    }

    pub async fn execute(&self, profile: BusinessProfile) -> anyhow::Result<UserAccount> {
        let mut account = self
            .local
            .account()
            .await?
            .context("no local account to attach a profile to")?;

        account.profile = Some(profile);
        account.has_completed_profile = true;
        self.local.save_account(&account).await?;

        self.trigger_backup.spawn(BackupDomain::Profile);
        // The completion flag also rides the settings snapshot.
        self.trigger_backup.spawn(BackupDomain::Settings);
        Ok(account)
    }
}

/// Merge a partial update into the current profile record.
pub struct UpdateProfileFields {
    local: Arc<LocalState>,
    save: Arc<SaveProfile>,
}

impl UpdateProfileFields {
    pub fn new(local: Arc<LocalState>, save: Arc<SaveProfile>) -> Self {
        Self { local, save }
    }

    pub async fn execute(&self, update: ProfileUpdate) -> anyhow::Result<UserAccount> {
        let account = self
            .local
            .account()
            .await?
            .context("no local account to update")?;

        let mut profile = account.profile.unwrap_or_default();
        profile.apply(update);
        self.save.execute(profile).await
    }
}

/// Replace the avatar reference.
pub struct SetAvatar {
    local: Arc<LocalState>,
    clock: Arc<dyn ClockPort>,
    trigger_backup: Arc<TriggerBackup>,
}

impl SetAvatar {
    pub fn new(
        local: Arc<LocalState>,
        clock: Arc<dyn ClockPort>,
        trigger_backup: Arc<TriggerBackup>,
    ) -> Self {
        Self {
            local,
            clock,
            trigger_backup,
        }
    }

    pub async fn execute(&self, uri: String) -> anyhow::Result<UserAccount> {
        let mut account = self
            .local
            .account()
            .await?
            .context("no local account to attach an avatar to")?;

        account.avatar = Some(Avatar {
            uri,
            updated_at: self.clock.now(),
        });
        self.local.save_account(&account).await?;

        self.trigger_backup.spawn(BackupDomain::Profile);
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::HistoryState;
    use crate::usecases::reconcile::PushBackup;
    use crate::usecases::testing::{map_store, FixedClock, MockBackupStore};
    use chrono::Utc;
    use uk_core::ports::BackupStorePort;
    use uk_core::{Identifier, UserId};

    struct Fixture {
        local: Arc<LocalState>,
        trigger: Arc<TriggerBackup>,
    }

    async fn fixture() -> Fixture {
        let local = Arc::new(LocalState::new(map_store()));
        local
            .save_account(&UserAccount::new(
                UserId::new("u-1"),
                Identifier::from("a@x.com"),
                Utc::now(),
            ))
            .await
            .unwrap();
        let push = Arc::new(PushBackup::new(
            Arc::new(MockBackupStore::default()) as Arc<dyn BackupStorePort>,
            Arc::clone(&local),
            Arc::new(HistoryState::new()),
            Arc::new(FixedClock::default()),
        ));
        Fixture {
            local,
            trigger: Arc::new(TriggerBackup::new(push)),
        }
    }

    #[tokio::test]
    async fn save_replaces_the_whole_record_and_completes_the_profile() {
        let f = fixture().await;
        let save = SaveProfile::new(Arc::clone(&f.local), Arc::clone(&f.trigger));

        let account = save
            .execute(BusinessProfile {
                business_name: Some("The Green Fork".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(account.has_completed_profile);
        let stored = f.local.account().await.unwrap().unwrap();
        assert_eq!(
            stored.profile.and_then(|p| p.business_name),
            Some("The Green Fork".to_string())
        );
    }

    #[tokio::test]
    async fn field_update_merges_into_the_current_record() {
        let f = fixture().await;
        let save = Arc::new(SaveProfile::new(Arc::clone(&f.local), Arc::clone(&f.trigger)));
        save.execute(BusinessProfile {
            business_name: Some("The Green Fork".into()),
            ..Default::default()
        })
        .await
        .unwrap();
        let update = UpdateProfileFields::new(Arc::clone(&f.local), save);

        let account = update
            .execute(ProfileUpdate {
                postcode: Some("SW1A 1AA".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let profile = account.profile.unwrap();
        assert_eq!(profile.business_name.as_deref(), Some("The Green Fork"));
        assert_eq!(profile.postcode.as_deref(), Some("SW1A 1AA"));
    }

    #[tokio::test]
    async fn save_without_an_account_is_an_error() {
        let local = Arc::new(LocalState::new(map_store()));
        let push = Arc::new(PushBackup::new(
            Arc::new(MockBackupStore::default()) as Arc<dyn BackupStorePort>,
            Arc::clone(&local),
            Arc::new(HistoryState::new()),
            Arc::new(FixedClock::default()),
        ));
        let save = SaveProfile::new(local, Arc::new(TriggerBackup::new(push)));

        assert!(save.execute(BusinessProfile::default()).await.is_err());
    }
}
