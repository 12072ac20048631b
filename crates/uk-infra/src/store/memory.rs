//! In-memory key/value store
//!
//! Drop-in stand-in for the file store in tests and previews; nothing
//! survives the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use uk_core::ports::LocalStorePort;

#[derive(Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStorePort for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> anyhow::Result<()> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}
