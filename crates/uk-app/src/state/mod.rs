//! Session-scoped application state
//!
//! [`LocalState`] is the typed face of the generic string key/value store;
//! [`HistoryState`] is the in-memory history list, deliberately never
//! persisted locally.

mod history_state;
mod local_state;

pub use history_state::HistoryState;
pub use local_state::{
    LocalState, ACCOUNT_KEY, DISPLAY_KEY, SESSION_KEY, SETTINGS_KEY,
};
