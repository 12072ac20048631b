//! Per-user backup domains and payloads
//!
//! The backup store holds one JSON blob per (user, domain). Domains are
//! independent: any of them may be absent, and a malformed one never
//! blocks the others.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

use crate::account::{Avatar, BusinessProfile};

/// Independently backed-up state category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupDomain {
    Profile,
    History,
    Settings,
}

impl BackupDomain {
    pub const ALL: [BackupDomain; 3] = [
        BackupDomain::Profile,
        BackupDomain::History,
        BackupDomain::Settings,
    ];

    /// Path segment used by the user-data API.
    pub fn as_str(self) -> &'static str {
        match self {
            BackupDomain::Profile => "profile",
            BackupDomain::History => "history",
            BackupDomain::Settings => "settings",
        }
    }
}

impl Display for BackupDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw per-domain payloads read back from the store.
///
/// Absence of a domain means "no prior backup" and is not an error.
#[derive(Debug, Clone, Default)]
pub struct DomainSnapshots {
    pub profile: Option<Value>,
    pub history: Option<Value>,
    pub settings: Option<Value>,
}

impl DomainSnapshots {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.history.is_none() && self.settings.is_none()
    }
}

/// Profile domain payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBackup {
    pub has_completed_profile: bool,
    #[serde(default)]
    pub profile: Option<BusinessProfile>,
    #[serde(default)]
    pub avatar: Option<Avatar>,
}
