//! Application dependency grouping and wiring.
//!
//! [`AppDeps`] is NOT a builder: no build steps, no defaults, no hidden
//! logic, just parameter grouping. The hosting application constructs the
//! adapters once per process and hands them over; [`App::new`] is the
//! dependency manifest.

use std::sync::Arc;

use uk_core::ports::{
    BackupStorePort, ClockPort, HistoryServicePort, LocalStorePort, VerificationPort,
};

use crate::state::{HistoryState, LocalState};
use crate::usecases::{
    AddAnalysisEntry, DeleteAnalysisEntry, PushBackup, RecordStreakDay, ResolveAccount,
    RestoreBackup, SaveProfile, SessionContext, SessionOrchestrator, SetAvatar, SetConsent,
    StartApp, TriggerBackup, UpdatePreferences, UpdateProfileFields,
};

/// Everything the application layer needs from the outside world.
pub struct AppDeps {
    pub verification: Arc<dyn VerificationPort>,
    pub backup_store: Arc<dyn BackupStorePort>,
    pub history_service: Arc<dyn HistoryServicePort>,
    pub local_store: Arc<dyn LocalStorePort>,
    pub clock: Arc<dyn ClockPort>,
}

/// The wired application runtime.
pub struct App {
    pub session: Arc<SessionOrchestrator>,
    pub start_app: Arc<StartApp>,
    pub trigger_backup: Arc<TriggerBackup>,
    pub save_profile: Arc<SaveProfile>,
    pub update_profile_fields: Arc<UpdateProfileFields>,
    pub set_avatar: Arc<SetAvatar>,
    pub set_consent: Arc<SetConsent>,
    pub update_preferences: Arc<UpdatePreferences>,
    pub record_streak_day: Arc<RecordStreakDay>,
    pub add_history_entry: Arc<AddAnalysisEntry>,
    pub delete_history_entry: Arc<DeleteAnalysisEntry>,
}

impl App {
    /// Wire every use case from the injected ports.
    ///
    /// This constructor signature IS the dependency manifest: all
    /// dependencies are required, none are discovered ambiently.
    pub fn new(deps: AppDeps) -> Self {
        let context = Arc::new(SessionContext::new());
        let local = Arc::new(LocalState::new(Arc::clone(&deps.local_store)));
        let history = Arc::new(HistoryState::new());

        let restore = Arc::new(RestoreBackup::new(
            Arc::clone(&deps.backup_store),
            Arc::clone(&local),
            Arc::clone(&history),
        ));
        let push = Arc::new(PushBackup::new(
            Arc::clone(&deps.backup_store),
            Arc::clone(&local),
            Arc::clone(&history),
            Arc::clone(&deps.clock),
        ));
        let trigger_backup = Arc::new(TriggerBackup::new(push));

        let resolve_account = Arc::new(ResolveAccount::new(
            Arc::clone(&local),
            Arc::clone(&history),
            Arc::clone(&deps.history_service),
            restore,
            Arc::clone(&deps.clock),
        ));

        let session = Arc::new(SessionOrchestrator::new(
            Arc::clone(&context),
            Arc::clone(&deps.verification),
            resolve_account,
            Arc::clone(&local),
            Arc::clone(&trigger_backup),
            Arc::clone(&deps.clock),
        ));

        let save_profile = Arc::new(SaveProfile::new(
            Arc::clone(&local),
            Arc::clone(&trigger_backup),
        ));

        Self {
            start_app: Arc::new(StartApp::new(Arc::clone(&local), Arc::clone(&context))),
            update_profile_fields: Arc::new(UpdateProfileFields::new(
                Arc::clone(&local),
                Arc::clone(&save_profile),
            )),
            set_avatar: Arc::new(SetAvatar::new(
                Arc::clone(&local),
                Arc::clone(&deps.clock),
                Arc::clone(&trigger_backup),
            )),
            set_consent: Arc::new(SetConsent::new(
                Arc::clone(&local),
                Arc::clone(&trigger_backup),
            )),
            update_preferences: Arc::new(UpdatePreferences::new(
                Arc::clone(&local),
                Arc::clone(&trigger_backup),
            )),
            record_streak_day: Arc::new(RecordStreakDay::new(
                Arc::clone(&local),
                Arc::clone(&trigger_backup),
            )),
            add_history_entry: Arc::new(AddAnalysisEntry::new(
                Arc::clone(&history),
                Arc::clone(&trigger_backup),
            )),
            delete_history_entry: Arc::new(DeleteAnalysisEntry::new(
                history,
                Arc::clone(&trigger_backup),
            )),
            save_profile,
            session,
            trigger_backup,
        }
    }
}
