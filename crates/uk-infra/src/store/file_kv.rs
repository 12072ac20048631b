//! File-based key/value store
//!
//! One file per key under the application data directory. Values are
//! opaque strings; payload encoding is the caller's concern. Writes are
//! synced so the slice survives an immediate process kill.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use uk_core::ports::LocalStorePort;

pub const DEFAULT_STORE_DIR: &str = "ukcal";

pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a store rooted at the given directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Create a store under the platform data directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let base = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("no platform data directory available"))?;
        Ok(Self::new(base.join(DEFAULT_STORE_DIR)))
    }

    fn item_path(&self, key: &str) -> PathBuf {
        // Keys are dotted names; keep them readable but never let one
        // escape the store directory.
        let sanitized: String = key
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.base_dir.join(sanitized)
    }

    async fn ensure_base_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.base_dir).await?;
        Ok(())
    }
}

#[async_trait]
impl LocalStorePort for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        Ok(Some(content))
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.ensure_base_dir().await?;

        let mut file = fs::File::create(self.item_path(key))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create store file: {}", e))?;

        file.write_all(value.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to write store file: {}", e))?;

        file.sync_all()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to sync store file: {}", e))?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        let path = self.item_path(key);
        if path.exists() {
            fs::remove_file(&path).await?;
        }
        Ok(())
    }
}
