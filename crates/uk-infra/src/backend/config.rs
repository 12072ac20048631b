use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend endpoint configuration shared by the HTTP adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// API gateway base URL, without a trailing slash.
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from an optional file plus `UKCAL_`-prefixed environment
    /// overrides (e.g. `UKCAL_BASE_URL`).
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)
            .context("set default timeout")?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        builder = builder.add_source(config::Environment::with_prefix("UKCAL"));

        builder
            .build()
            .context("assemble backend config")?
            .try_deserialize()
            .context("backend config invalid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_filled_in() {
        let config = BackendConfig::new("https://api.example.test");

        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.api_key, None);
    }
}
