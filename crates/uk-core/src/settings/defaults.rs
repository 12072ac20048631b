use super::model::*;

impl Default for Preferences {
    fn default() -> Self {
        Self {
            camera_flash: false,
            save_to_gallery: true,
            notifications_enabled: true,
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            has_consented: None,
            preferences: Preferences::default(),
            streak_days: 0,
        }
    }
}
