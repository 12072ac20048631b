//! Typed access to the persisted local store.
//!
//! The store itself is a generic string key/value port; this wrapper owns
//! the fixed keys and the JSON encoding of each state slice.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use uk_core::ports::LocalStorePort;
use uk_core::rehydrate::{DisplayState, PersistedAppState};
use uk_core::session::SessionMarker;
use uk_core::settings::AppSettings;
use uk_core::UserAccount;

pub const ACCOUNT_KEY: &str = "ukcal.account";
pub const SESSION_KEY: &str = "ukcal.session";
pub const SETTINGS_KEY: &str = "ukcal.settings";
pub const DISPLAY_KEY: &str = "ukcal.display";

pub struct LocalState {
    store: Arc<dyn LocalStorePort>,
}

impl LocalState {
    pub fn new(store: Arc<dyn LocalStorePort>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(raw) = self.store.get_item(key).await? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("corrupt local state under {key}"))?;
        Ok(Some(value))
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("encode local state for {key}"))?;
        self.store.set_item(key, &raw).await
    }

    pub async fn account(&self) -> Result<Option<UserAccount>> {
        self.read(ACCOUNT_KEY).await
    }

    pub async fn save_account(&self, account: &UserAccount) -> Result<()> {
        self.write(ACCOUNT_KEY, account).await
    }

    pub async fn session_marker(&self) -> Result<Option<SessionMarker>> {
        self.read(SESSION_KEY).await
    }

    pub async fn save_session_marker(&self, marker: &SessionMarker) -> Result<()> {
        self.write(SESSION_KEY, marker).await
    }

    pub async fn clear_session_marker(&self) -> Result<()> {
        self.store.remove_item(SESSION_KEY).await
    }

    /// Settings slice; defaults when nothing was persisted yet.
    pub async fn settings(&self) -> Result<AppSettings> {
        Ok(self.read(SETTINGS_KEY).await?.unwrap_or_default())
    }

    pub async fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        self.write(SETTINGS_KEY, settings).await
    }

    pub async fn display(&self) -> Result<DisplayState> {
        Ok(self.read(DISPLAY_KEY).await?.unwrap_or_default())
    }

    pub async fn save_display(&self, display: &DisplayState) -> Result<()> {
        self.write(DISPLAY_KEY, display).await
    }

    /// Assemble the full persisted snapshot for cold-start rehydration.
    pub async fn load_app_state(&self) -> Result<PersistedAppState> {
        Ok(PersistedAppState {
            account: self.account().await?,
            session: self.session_marker().await?,
            settings: self.settings().await?,
            display: self.display().await?,
        })
    }
}
