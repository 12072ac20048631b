//! Session state machine.
//!
//! Defines a pure state transition function for the authentication
//! lifecycle. Side effects (provider calls, account resolution, marker
//! writes) are emitted as actions; the orchestrator executes them and
//! feeds the outcomes back in as events.

use crate::account::{Channel, ClosureMode, Identifier};

use super::SessionError;

/// Authentication lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SessionState {
    /// No verified identity.
    Anonymous { error: Option<SessionError> },
    /// A one-time code has been delivered.
    CodeSent { channel: Channel },
    /// Code submitted; verification and account resolution in flight.
    Verifying,
    /// Verified identity with consistent local state.
    Authenticated { identifier: Identifier },
    /// Account deletion (anonymization) in flight.
    DeletingAccount { identifier: Identifier },
    /// Participation withdrawal in flight.
    Withdrawing { identifier: Identifier },
}

impl SessionState {
    pub fn initial() -> Self {
        SessionState::Anonymous { error: None }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Events that drive the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User asks for a one-time code.
    RequestCode {
        identifier: Identifier,
        channel: Channel,
    },
    /// Provider confirmed code delivery.
    CodeDelivered { channel: Channel },
    /// Provider reported or threw a delivery failure.
    CodeDeliveryFailed { reason: SessionError },
    /// User submits the received code.
    SubmitCode {
        identifier: Identifier,
        code: String,
        channel: Channel,
    },
    /// Provider accepted the code.
    VerificationSucceeded {
        identifier: Identifier,
        provider_user_id: Option<String>,
    },
    /// Provider rejected the code or failed.
    VerificationFailed { reason: SessionError },
    /// Account resolution finished; local state is consistent.
    AccountReady { identifier: Identifier },
    /// Account resolution failed (local store unreadable).
    ResolutionFailed { reason: SessionError },
    /// User logs out, retaining local data.
    Logout,
    /// User confirmed account deletion.
    RequestAccountDeletion,
    /// Anonymization for deletion finished.
    DeletionCompleted,
    /// Anonymization for deletion failed.
    DeletionFailed { reason: SessionError },
    /// User withdrew participation.
    RequestWithdrawal,
    /// Anonymization for withdrawal finished.
    WithdrawalCompleted,
}

/// Side-effects produced by state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// Ask the provider to deliver a code.
    DeliverCode {
        identifier: Identifier,
        channel: Channel,
    },
    /// Ask the provider to verify a submitted code.
    VerifyCode {
        identifier: Identifier,
        code: String,
        channel: Channel,
    },
    /// Run account resolution for the verified identifier.
    ResolveAccount {
        identifier: Identifier,
        provider_user_id: Option<String>,
    },
    /// Scrub the identifying field on the local account.
    AnonymizeAccount {
        identifier: Identifier,
        mode: ClosureMode,
    },
    /// Remove the persisted logged-in marker. Account, profile, history
    /// and settings stay in place.
    ClearSessionMarker,
}

/// Pure session state machine.
pub struct SessionStateMachine;

impl SessionStateMachine {
    pub fn transition(
        state: SessionState,
        event: SessionEvent,
    ) -> (SessionState, Vec<SessionAction>) {
        match (state, event) {
            // Requesting a code is allowed while anonymous and as a resend.
            (
                SessionState::Anonymous { .. } | SessionState::CodeSent { .. },
                SessionEvent::RequestCode {
                    identifier,
                    channel,
                },
            ) => (
                SessionState::Anonymous { error: None },
                vec![SessionAction::DeliverCode {
                    identifier,
                    channel,
                }],
            ),
            (
                SessionState::Anonymous { .. } | SessionState::CodeSent { .. },
                SessionEvent::CodeDelivered { channel },
            ) => (SessionState::CodeSent { channel }, Vec::new()),
            (
                SessionState::Anonymous { .. } | SessionState::CodeSent { .. },
                SessionEvent::CodeDeliveryFailed { reason },
            ) => (
                SessionState::Anonymous {
                    error: Some(reason),
                },
                Vec::new(),
            ),
            (
                SessionState::CodeSent { .. },
                SessionEvent::SubmitCode {
                    identifier,
                    code,
                    channel,
                },
            ) => (
                SessionState::Verifying,
                vec![SessionAction::VerifyCode {
                    identifier,
                    code,
                    channel,
                }],
            ),
            // A second submission while one is resolving is ignored; the
            // Verifying state is the implicit mutex.
            (SessionState::Verifying, SessionEvent::SubmitCode { .. }) => {
                (SessionState::Verifying, Vec::new())
            }
            (
                SessionState::Verifying,
                SessionEvent::VerificationSucceeded {
                    identifier,
                    provider_user_id,
                },
            ) => (
                SessionState::Verifying,
                vec![SessionAction::ResolveAccount {
                    identifier,
                    provider_user_id,
                }],
            ),
            (SessionState::Verifying, SessionEvent::VerificationFailed { reason }) => (
                SessionState::Anonymous {
                    error: Some(reason),
                },
                Vec::new(),
            ),
            (SessionState::Verifying, SessionEvent::AccountReady { identifier }) => {
                (SessionState::Authenticated { identifier }, Vec::new())
            }
            (SessionState::Verifying, SessionEvent::ResolutionFailed { reason }) => (
                SessionState::Anonymous {
                    error: Some(reason),
                },
                Vec::new(),
            ),
            (SessionState::Authenticated { .. }, SessionEvent::Logout) => (
                SessionState::Anonymous { error: None },
                vec![SessionAction::ClearSessionMarker],
            ),
            (SessionState::Authenticated { identifier }, SessionEvent::RequestAccountDeletion) => (
                SessionState::DeletingAccount {
                    identifier: identifier.clone(),
                },
                vec![SessionAction::AnonymizeAccount {
                    identifier,
                    mode: ClosureMode::Deletion,
                }],
            ),
            (SessionState::DeletingAccount { .. }, SessionEvent::DeletionCompleted) => (
                SessionState::Anonymous { error: None },
                vec![SessionAction::ClearSessionMarker],
            ),
            // A failed anonymization leaves the session authenticated;
            // the error is surfaced on the projection.
            (
                SessionState::DeletingAccount { identifier }
                | SessionState::Withdrawing { identifier },
                SessionEvent::DeletionFailed { .. },
            ) => (SessionState::Authenticated { identifier }, Vec::new()),
            (SessionState::Authenticated { identifier }, SessionEvent::RequestWithdrawal) => (
                SessionState::Withdrawing {
                    identifier: identifier.clone(),
                },
                vec![SessionAction::AnonymizeAccount {
                    identifier,
                    mode: ClosureMode::Withdrawal,
                }],
            ),
            (SessionState::Withdrawing { .. }, SessionEvent::WithdrawalCompleted) => (
                SessionState::Anonymous { error: None },
                vec![SessionAction::ClearSessionMarker],
            ),
            (state, _event) => (state, Vec::new()),
        }
    }
}
