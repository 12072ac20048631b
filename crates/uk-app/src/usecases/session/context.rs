use tokio::sync::Mutex;

use uk_core::session::{
    Session, SessionAction, SessionError, SessionEvent, SessionState, SessionStateMachine,
};

struct ContextInner {
    state: SessionState,
    is_loading: bool,
    last_error: Option<String>,
}

/// Shared session state: the machine state plus the bits of UI feedback
/// (loading flag, last error) that sit outside the pure machine.
pub struct SessionContext {
    inner: Mutex<ContextInner>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_state(SessionState::initial())
    }

    pub fn with_state(state: SessionState) -> Self {
        Self {
            inner: Mutex::new(ContextInner {
                state,
                is_loading: false,
                last_error: None,
            }),
        }
    }

    /// Run one machine transition under the context lock and return the
    /// actions to execute.
    pub async fn apply(&self, event: SessionEvent) -> Vec<SessionAction> {
        let mut inner = self.inner.lock().await;
        let (next, actions) = SessionStateMachine::transition(inner.state.clone(), event);
        if let SessionState::Anonymous {
            error: Some(reason),
        } = &next
        {
            inner.last_error = Some(reason.to_string());
        }
        inner.state = next;
        actions
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state.clone()
    }

    pub async fn set_state(&self, state: SessionState) {
        self.inner.lock().await.state = state;
    }

    /// Mark the start of a user-initiated operation.
    pub async fn begin(&self) {
        let mut inner = self.inner.lock().await;
        inner.is_loading = true;
        inner.last_error = None;
    }

    /// Mark the end of a user-initiated operation.
    pub async fn finish(&self) {
        self.inner.lock().await.is_loading = false;
    }

    pub async fn record_error(&self, error: impl Into<String>) {
        self.inner.lock().await.last_error = Some(error.into());
    }

    pub async fn record_failure(&self, reason: &SessionError) {
        self.record_error(reason.to_string()).await;
    }

    /// Observable projection consumed by the UI.
    pub async fn session(&self) -> Session {
        let inner = self.inner.lock().await;
        let identifier = match &inner.state {
            SessionState::Authenticated { identifier }
            | SessionState::DeletingAccount { identifier }
            | SessionState::Withdrawing { identifier } => Some(identifier.clone()),
            _ => None,
        };
        Session {
            identifier,
            is_authenticated: inner.state.is_authenticated(),
            is_loading: inner.is_loading,
            last_error: inner.last_error.clone(),
        }
    }
}
