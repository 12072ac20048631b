//! Persisted local store port
//!
//! Generic durable key/value storage with string-serialized payloads.
//! Survives process restarts; not authoritative across device changes.

use async_trait::async_trait;

#[async_trait]
pub trait LocalStorePort: Send + Sync {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()>;

    async fn remove_item(&self, key: &str) -> anyhow::Result<()>;
}
