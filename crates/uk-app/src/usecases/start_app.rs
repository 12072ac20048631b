//! Process-start bootstrap.
//!
//! Loads the persisted snapshot, applies the rehydration transform exactly
//! once, and rebuilds the session projection from the cached logged-in
//! marker. History is not loaded here; it is fetched from the history
//! service once a session is authenticated.

use std::sync::Arc;

use tracing::info;

use uk_core::session::{Session, SessionState};

use crate::state::LocalState;
use crate::usecases::session::SessionContext;

pub struct StartApp {
    local: Arc<LocalState>,
    context: Arc<SessionContext>,
}

impl StartApp {
    pub fn new(local: Arc<LocalState>, context: Arc<SessionContext>) -> Self {
        Self { local, context }
    }

    pub async fn execute(&self) -> anyhow::Result<Session> {
        let state = self.local.load_app_state().await?.rehydrate();
        self.local.save_display(&state.display).await?;

        if let Some(marker) = &state.session {
            if marker.is_verified {
                info!(identifier = %marker.identifier, "restoring authenticated session");
                self.context
                    .set_state(SessionState::Authenticated {
                        identifier: marker.identifier.clone(),
                    })
                    .await;
            }
        }

        Ok(self.context.session().await)
    }
}
