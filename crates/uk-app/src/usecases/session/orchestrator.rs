//! Session orchestrator.
//!
//! Drives the pure session state machine and executes its side effects:
//! provider calls, account resolution, marker writes and account
//! anonymization. Outcomes are fed back into the machine as events, so
//! the machine alone decides what the session looks like at every step.

use std::sync::Arc;

use anyhow::anyhow;
use tracing::{info, warn};

use uk_core::ports::{ClockPort, VerificationPort};
use uk_core::session::{Session, SessionAction, SessionError, SessionEvent};
use uk_core::{Channel, ClosureMode, Identifier};

use crate::state::LocalState;
use crate::usecases::account::{ResolveAccount, ResolveError};
use crate::usecases::reconcile::TriggerBackup;

use super::SessionContext;

/// Failures surfaced to the UI action that caused them.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("code delivery failed: {0}")]
    CodeSend(#[source] anyhow::Error),
    #[error("code verification failed: {0}")]
    Verification(String),
    #[error("account resolution failed: {0}")]
    AccountResolution(#[source] ResolveError),
    #[error("account deletion failed: {0}")]
    Deletion(String),
}

pub struct SessionOrchestrator {
    context: Arc<SessionContext>,
    verification: Arc<dyn VerificationPort>,
    resolve_account: Arc<ResolveAccount>,
    local: Arc<LocalState>,
    trigger_backup: Arc<TriggerBackup>,
    clock: Arc<dyn ClockPort>,
}

impl SessionOrchestrator {
    pub fn new(
        context: Arc<SessionContext>,
        verification: Arc<dyn VerificationPort>,
        resolve_account: Arc<ResolveAccount>,
        local: Arc<LocalState>,
        trigger_backup: Arc<TriggerBackup>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            context,
            verification,
            resolve_account,
            local,
            trigger_backup,
            clock,
        }
    }

    /// Current observable projection.
    pub async fn session(&self) -> Session {
        self.context.session().await
    }

    /// Ask the provider to deliver a one-time code.
    pub async fn send_code(
        &self,
        identifier: Identifier,
        channel: Channel,
    ) -> Result<(), AuthError> {
        self.context.begin().await;
        let actions = self
            .context
            .apply(SessionEvent::RequestCode {
                identifier,
                channel,
            })
            .await;

        let mut outcome = Ok(());
        for action in actions {
            if let SessionAction::DeliverCode {
                identifier,
                channel,
            } = action
            {
                outcome = self.deliver_code(&identifier, channel).await;
            }
        }
        self.context.finish().await;
        outcome
    }

    async fn deliver_code(
        &self,
        identifier: &Identifier,
        channel: Channel,
    ) -> Result<(), AuthError> {
        let failure = match self.verification.send_code(identifier, channel).await {
            Ok(true) => {
                self.context
                    .apply(SessionEvent::CodeDelivered { channel })
                    .await;
                return Ok(());
            }
            Ok(false) => anyhow!("provider declined code delivery"),
            Err(err) => err,
        };

        self.context
            .apply(SessionEvent::CodeDeliveryFailed {
                reason: SessionError::CodeSend(failure.to_string()),
            })
            .await;
        Err(AuthError::CodeSend(failure))
    }

    /// Submit a received code. On success, account resolution runs before
    /// the session is marked authenticated, so the UI never observes an
    /// authenticated session with inconsistent local state.
    pub async fn submit_code(
        &self,
        identifier: Identifier,
        code: String,
        channel: Channel,
    ) -> Result<Session, AuthError> {
        self.context.begin().await;
        let actions = self
            .context
            .apply(SessionEvent::SubmitCode {
                identifier,
                code,
                channel,
            })
            .await;

        // No actions: a concurrent submission is already resolving, or no
        // code challenge is pending. Tolerated, not started again.
        let mut outcome = Ok(());
        for action in actions {
            if let SessionAction::VerifyCode {
                identifier,
                code,
                channel,
            } = action
            {
                outcome = self.verify_and_resolve(&identifier, &code, channel).await;
            }
        }

        self.context.finish().await;
        outcome?;
        Ok(self.context.session().await)
    }

    async fn verify_and_resolve(
        &self,
        identifier: &Identifier,
        code: &str,
        channel: Channel,
    ) -> Result<(), AuthError> {
        let outcome = match self.verification.verify_code(identifier, code, channel).await {
            Ok(outcome) if outcome.success => outcome,
            Ok(_) => return self.fail_verification("invalid or expired code").await,
            Err(err) => return self.fail_verification(err.to_string()).await,
        };

        let actions = self
            .context
            .apply(SessionEvent::VerificationSucceeded {
                identifier: identifier.clone(),
                provider_user_id: outcome.provider_user_id,
            })
            .await;

        for action in actions {
            if let SessionAction::ResolveAccount {
                identifier,
                provider_user_id,
            } = action
            {
                match self
                    .resolve_account
                    .execute(&identifier, provider_user_id)
                    .await
                {
                    Ok(account) => {
                        self.context
                            .apply(SessionEvent::AccountReady {
                                identifier: identifier.clone(),
                            })
                            .await;
                        info!(user_id = %account.user_id, "session authenticated");
                        // Login completion is itself a state-changing
                        // event: snapshot every domain.
                        self.trigger_backup.spawn_all();
                    }
                    Err(err) => {
                        self.context
                            .apply(SessionEvent::ResolutionFailed {
                                reason: SessionError::AccountResolution(err.to_string()),
                            })
                            .await;
                        return Err(AuthError::AccountResolution(err));
                    }
                }
            }
        }
        Ok(())
    }

    async fn fail_verification(&self, reason: impl Into<String>) -> Result<(), AuthError> {
        let reason = reason.into();
        self.context
            .apply(SessionEvent::VerificationFailed {
                reason: SessionError::Verification(reason.clone()),
            })
            .await;
        Err(AuthError::Verification(reason))
    }

    /// Clear the logged-in marker, retaining account, profile, history
    /// and settings so the same identifier can re-authenticate without
    /// data loss.
    pub async fn logout(&self) -> Result<Session, AuthError> {
        self.context.begin().await;
        let actions = self.context.apply(SessionEvent::Logout).await;
        for action in actions {
            if let SessionAction::ClearSessionMarker = action {
                if let Err(err) = self.local.clear_session_marker().await {
                    warn!(error = %err, "failed to clear session marker");
                }
                if let Err(err) = self.verification.logout().await {
                    warn!(error = %err, "provider logout failed");
                }
            }
        }
        self.context.finish().await;
        Ok(self.context.session().await)
    }

    /// Deliver the deletion-confirmation code.
    pub async fn send_delete_code(&self, identifier: Identifier) -> Result<(), AuthError> {
        match self.verification.send_delete_code(&identifier).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                let reason = "provider declined deletion code delivery".to_string();
                self.context.record_error(&reason).await;
                Err(AuthError::Deletion(reason))
            }
            Err(err) => {
                self.context.record_error(err.to_string()).await;
                Err(AuthError::Deletion(err.to_string()))
            }
        }
    }

    /// Verify the deletion code, then irreversibly anonymize the account
    /// and end the session.
    pub async fn delete_account(&self, code: String) -> Result<Session, AuthError> {
        self.context.begin().await;
        let result = self.close_account(Some(&code)).await;
        self.context.finish().await;
        result?;
        Ok(self.context.session().await)
    }

    /// Withdraw participation: same anonymization contract as deletion,
    /// semantically distinct, and not guarded by a code.
    pub async fn withdraw_participation(&self) -> Result<Session, AuthError> {
        self.context.begin().await;
        let result = self.close_account(None).await;
        self.context.finish().await;
        result?;
        Ok(self.context.session().await)
    }

    async fn close_account(&self, delete_code: Option<&str>) -> Result<(), AuthError> {
        let request = match delete_code {
            Some(code) => {
                let identifier = match self.context.session().await.identifier {
                    Some(identifier) => identifier,
                    None => {
                        return Err(AuthError::Deletion("no authenticated session".into()))
                    }
                };
                let confirmed = self
                    .verification
                    .verify_delete_code(&identifier, code)
                    .await
                    .map_err(|err| AuthError::Deletion(err.to_string()))?;
                if !confirmed {
                    let reason = "invalid or expired deletion code".to_string();
                    self.context.record_error(&reason).await;
                    return Err(AuthError::Deletion(reason));
                }
                SessionEvent::RequestAccountDeletion
            }
            None => SessionEvent::RequestWithdrawal,
        };

        let actions = self.context.apply(request).await;
        if actions.is_empty() {
            return Err(AuthError::Deletion("no authenticated session".into()));
        }

        for action in actions {
            if let SessionAction::AnonymizeAccount { identifier, mode } = action {
                match self.anonymize(&identifier, mode).await {
                    Ok(()) => {
                        let completed = match mode {
                            ClosureMode::Deletion => SessionEvent::DeletionCompleted,
                            ClosureMode::Withdrawal => SessionEvent::WithdrawalCompleted,
                        };
                        let follow_ups = self.context.apply(completed).await;
                        for follow_up in follow_ups {
                            if let SessionAction::ClearSessionMarker = follow_up {
                                if let Err(err) = self.local.clear_session_marker().await {
                                    warn!(error = %err, "failed to clear session marker");
                                }
                            }
                        }
                        if let Err(err) = self.verification.logout().await {
                            warn!(error = %err, "provider logout failed");
                        }
                    }
                    Err(err) => {
                        let reason = SessionError::Deletion(err.to_string());
                        self.context
                            .apply(SessionEvent::DeletionFailed {
                                reason: reason.clone(),
                            })
                            .await;
                        self.context.record_failure(&reason).await;
                        return Err(AuthError::Deletion(err.to_string()));
                    }
                }
            }
        }
        Ok(())
    }

    async fn anonymize(&self, identifier: &Identifier, mode: ClosureMode) -> anyhow::Result<()> {
        let Some(mut account) = self.local.account().await? else {
            // Nothing local to scrub; the session still ends.
            return Ok(());
        };
        if !account.matches_identifier(identifier) {
            return Ok(());
        }
        account.anonymize(self.clock.now());
        self.local.save_account(&account).await?;
        info!(user_id = %account.user_id, ?mode, "account anonymized");
        Ok(())
    }
}
