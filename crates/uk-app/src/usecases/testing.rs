//! Shared test doubles for the use-case suites.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use uk_core::backup::{BackupDomain, DomainSnapshots};
use uk_core::history::AnalysisEntry;
use uk_core::ports::{
    BackupStorePort, ClockPort, HistoryServicePort, LocalStorePort, VerificationPort,
    VerifyOutcome,
};
use uk_core::{Channel, Identifier, UserId};

/// Plain in-memory key/value store.
#[derive(Default)]
pub struct MapStore {
    items: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl LocalStorePort for MapStore {
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

pub fn map_store() -> Arc<dyn LocalStorePort> {
    Arc::new(MapStore::default())
}

/// Seedable backup store with switchable failure modes and write counting.
#[derive(Default)]
pub struct MockBackupStore {
    domains: Mutex<HashMap<(String, BackupDomain), Value>>,
    write_count: AtomicUsize,
    read_count: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MockBackupStore {
    pub fn seed(&self, user_id: &UserId, domain: BackupDomain, payload: Value) {
        self.domains
            .lock()
            .unwrap()
            .insert((user_id.as_str().to_string(), domain), payload);
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn written(&self, user_id: &UserId, domain: BackupDomain) -> Option<Value> {
        self.domains
            .lock()
            .unwrap()
            .get(&(user_id.as_str().to_string(), domain))
            .cloned()
    }
}

#[async_trait]
impl BackupStorePort for MockBackupStore {
    async fn write_domain(
        &self,
        user_id: &UserId,
        domain: BackupDomain,
        payload: Value,
    ) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated backup write failure"));
        }
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.seed(user_id, domain, payload);
        Ok(())
    }

    async fn read_all_domains(&self, user_id: &UserId) -> anyhow::Result<DomainSnapshots> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated backup read failure"));
        }
        self.read_count.fetch_add(1, Ordering::SeqCst);
        let domains = self.domains.lock().unwrap();
        let get = |domain| {
            domains
                .get(&(user_id.as_str().to_string(), domain))
                .cloned()
        };
        Ok(DomainSnapshots {
            profile: get(BackupDomain::Profile),
            history: get(BackupDomain::History),
            settings: get(BackupDomain::Settings),
        })
    }
}

/// History service returning a canned list, or failing on demand.
#[derive(Default)]
pub struct MockHistoryService {
    entries: Mutex<Vec<AnalysisEntry>>,
    unreachable: AtomicBool,
}

impl MockHistoryService {
    pub fn with_entries(entries: Vec<AnalysisEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            unreachable: AtomicBool::new(false),
        }
    }

    pub fn make_unreachable(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryServicePort for MockHistoryService {
    async fn get_history(&self, _identifier: &Identifier) -> anyhow::Result<Vec<AnalysisEntry>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated history service outage"));
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

/// Verification provider accepting a single valid code.
pub struct MockVerification {
    pub valid_code: String,
    pub provider_user_id: Option<String>,
    pub fail_send: AtomicBool,
}

impl Default for MockVerification {
    fn default() -> Self {
        Self {
            valid_code: "123456".to_string(),
            provider_user_id: None,
            fail_send: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl VerificationPort for MockVerification {
    async fn send_code(&self, _identifier: &Identifier, _channel: Channel) -> anyhow::Result<bool> {
        Ok(!self.fail_send.load(Ordering::SeqCst))
    }

    async fn verify_code(
        &self,
        _identifier: &Identifier,
        code: &str,
        _channel: Channel,
    ) -> anyhow::Result<VerifyOutcome> {
        Ok(VerifyOutcome {
            success: code == self.valid_code,
            provider_user_id: self.provider_user_id.clone(),
        })
    }

    async fn logout(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn send_delete_code(&self, _identifier: &Identifier) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn verify_delete_code(
        &self,
        _identifier: &Identifier,
        code: &str,
    ) -> anyhow::Result<bool> {
        Ok(code == self.valid_code)
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap())
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
