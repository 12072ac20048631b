use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device-dependent capture and notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub camera_flash: bool,
    pub save_to_gallery: bool,
    pub notifications_enabled: bool,
}

/// Locally persisted settings state.
///
/// `has_consented` is tri-state: `None` means the user was never asked.
/// It is defaulted to "not granted" only during account resolution, never
/// on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    pub has_consented: Option<bool>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub streak_days: u32,
}

/// Settings snapshot pushed to the backup store.
///
/// Each push fully replaces the remote copy. `None` flags mean "unset" and
/// are ignored on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsBackup {
    pub has_consented: Option<bool>,
    pub has_completed_profile: Option<bool>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub streak_days: u32,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_backup_tolerates_missing_flags() {
        // 旧备份可能缺少这两个标志位
        let backup: SettingsBackup = serde_json::from_str(
            r#"{"has_consented":null,"has_completed_profile":null,"updated_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(backup.has_consented, None);
        assert_eq!(backup.has_completed_profile, None);
        assert_eq!(backup.streak_days, 0);
        assert_eq!(backup.preferences, Preferences::default());
    }

    #[test]
    fn app_settings_default_is_unset_consent() {
        let settings = AppSettings::default();
        assert_eq!(settings.has_consented, None);
        assert_eq!(settings.streak_days, 0);
    }
}
