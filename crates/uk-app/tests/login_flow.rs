//! End-to-end login, restore, logout and deletion flows over the wired
//! application runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

use uk_app::{App, AppDeps};
use uk_core::backup::{BackupDomain, DomainSnapshots};
use uk_core::history::AnalysisEntry;
use uk_core::ports::{
    BackupStorePort, ClockPort, HistoryServicePort, VerificationPort, VerifyOutcome,
};
use uk_core::{Channel, Identifier, UserId};
use uk_infra::MemoryKeyValueStore;

struct StubVerification {
    provider_user_id: Option<String>,
}

#[async_trait]
impl VerificationPort for StubVerification {
    async fn send_code(&self, _identifier: &Identifier, _channel: Channel) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn verify_code(
        &self,
        _identifier: &Identifier,
        code: &str,
        _channel: Channel,
    ) -> anyhow::Result<VerifyOutcome> {
        Ok(VerifyOutcome {
            success: code == "123456",
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
        Ok(code == "123456")
    }
}

#[derive(Default)]
struct StubBackupStore {
    domains: Mutex<HashMap<(String, BackupDomain), Value>>,
    reads: AtomicUsize,
    fail_writes: AtomicBool,
}

impl StubBackupStore {
    fn seed(&self, user_id: &str, domain: BackupDomain, payload: Value) {
        self.domains
            .lock()
            .unwrap()
            .insert((user_id.to_string(), domain), payload);
    }
}

#[async_trait]
impl BackupStorePort for StubBackupStore {
    async fn write_domain(
        &self,
        user_id: &UserId,
        domain: BackupDomain,
        payload: Value,
    ) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated backup outage"));
        }
        self.domains
            .lock()
            .unwrap()
            .insert((user_id.as_str().to_string(), domain), payload);
        Ok(())
    }

    async fn read_all_domains(&self, user_id: &UserId) -> anyhow::Result<DomainSnapshots> {
        self.reads.fetch_add(1, Ordering::SeqCst);
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

#[derive(Default)]
struct StubHistoryService {
    entries: Mutex<Vec<AnalysisEntry>>,
    unreachable: AtomicBool,
}

#[async_trait]
impl HistoryServicePort for StubHistoryService {
    async fn get_history(&self, _identifier: &Identifier) -> anyhow::Result<Vec<AnalysisEntry>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated history outage"));
        }
        Ok(self.entries.lock().unwrap().clone())
    }
}

struct TestClock;

impl ClockPort for TestClock {
    fn now(&self) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 1, 10, 0, 0).unwrap()
    }
}

struct Harness {
    app: App,
    backup_store: Arc<StubBackupStore>,
    history_service: Arc<StubHistoryService>,
}

fn harness_with(provider_user_id: Option<&str>) -> Harness {
    let backup_store = Arc::new(StubBackupStore::default());
    let history_service = Arc::new(StubHistoryService::default());
    let app = App::new(AppDeps {
        verification: Arc::new(StubVerification {
            provider_user_id: provider_user_id.map(str::to_string),
        }),
        backup_store: Arc::clone(&backup_store) as Arc<dyn BackupStorePort>,
        history_service: Arc::clone(&history_service) as Arc<dyn HistoryServicePort>,
        local_store: Arc::new(MemoryKeyValueStore::new()),
        clock: Arc::new(TestClock),
    });
    Harness {
        app,
        backup_store,
        history_service,
    }
}

async fn login(app: &App) {
    app.session
        .send_code(Identifier::from("a@x.com"), Channel::Email)
        .await
        .unwrap();
    app.session
        .submit_code(Identifier::from("a@x.com"), "123456".into(), Channel::Email)
        .await
        .unwrap();
}

#[tokio::test]
async fn fresh_login_without_backup_yields_a_blank_account() {
    let h = harness_with(Some("stable-1"));

    login(&h.app).await;

    let session = h.app.session.session().await;
    assert!(session.is_authenticated);
    assert_eq!(
        session.identifier.as_ref().map(|i| i.as_str()),
        Some("a@x.com")
    );

    let start = h.app.start_app.execute().await.unwrap();
    assert!(start.is_authenticated);
}

#[tokio::test]
async fn login_restores_history_and_completion_from_backup() {
    let h = harness_with(Some("stable-1"));
    h.backup_store.seed(
        "stable-1",
        BackupDomain::Profile,
        json!({"has_completed_profile": true}),
    );
    h.backup_store.seed(
        "stable-1",
        BackupDomain::History,
        json!([
            {"id": "h1", "kind": "image", "captured_at": "2026-03-01T08:00:00Z"},
            {"id": "h2", "kind": "image", "captured_at": "2026-03-02T08:00:00Z"},
            {"id": "h3", "kind": "video", "captured_at": "2026-03-03T08:00:00Z"},
        ]),
    );

    login(&h.app).await;

    assert!(h.app.session.session().await.is_authenticated);
    // Deleting one of the three restored entries proves the list length.
    assert!(h.app.delete_history_entry.execute("h2").await);
    assert!(!h.app.delete_history_entry.execute("h9").await);
}

#[tokio::test]
async fn logout_then_login_skips_the_reconciliation_path() {
    let h = harness_with(Some("stable-1"));

    login(&h.app).await;
    let reads_after_first = h.backup_store.reads.load(Ordering::SeqCst);

    let session = h.app.session.logout().await.unwrap();
    assert!(!session.is_authenticated);

    login(&h.app).await;

    assert!(h.app.session.session().await.is_authenticated);
    // Local account still matches, so no pull ran on the second login.
    assert_eq!(
        h.backup_store.reads.load(Ordering::SeqCst),
        reads_after_first
    );
}

#[tokio::test]
async fn backup_outage_never_fails_a_user_action() {
    let h = harness_with(None);
    h.backup_store.fail_writes.store(true, Ordering::SeqCst);

    login(&h.app).await;
    let mut handles = h.app.trigger_backup.spawn_all();
    handles.push(h.app.trigger_backup.spawn(BackupDomain::Settings));
    for handle in handles {
        handle.await.unwrap();
    }

    let session = h.app.session.session().await;
    assert!(session.is_authenticated);
    assert_eq!(session.last_error, None);

    // Consent change still succeeds while its push quietly fails.
    h.app.set_consent.execute(true).await.unwrap();
}

#[tokio::test]
async fn profile_save_is_snapshotted_to_the_backup_store() {
    let h = harness_with(Some("stable-1"));
    login(&h.app).await;

    h.app
        .save_profile
        .execute(uk_core::BusinessProfile {
            business_name: Some("The Green Fork".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    // Settle the detached pushes before inspecting the store.
    for handle in h.app.trigger_backup.spawn_all() {
        handle.await.unwrap();
    }

    let stored = h
        .backup_store
        .domains
        .lock()
        .unwrap()
        .get(&("stable-1".to_string(), BackupDomain::Profile))
        .cloned()
        .expect("profile snapshot pushed");
    assert_eq!(stored["has_completed_profile"], true);
    assert_eq!(stored["profile"]["business_name"], "The Green Fork");
}

#[tokio::test]
async fn returning_login_with_history_survives_a_history_outage() {
    let h = harness_with(Some("stable-1"));
    login(&h.app).await;
    h.app.session.logout().await.unwrap();
    h.history_service.unreachable.store(true, Ordering::SeqCst);

    login(&h.app).await;

    assert!(h.app.session.session().await.is_authenticated);
}

#[tokio::test]
async fn deletion_requires_its_own_code_round_trip() {
    let h = harness_with(Some("stable-1"));
    login(&h.app).await;

    h.app
        .session
        .send_delete_code(Identifier::from("a@x.com"))
        .await
        .unwrap();
    let err = h.app.session.delete_account("000000".into()).await;
    assert!(err.is_err());
    assert!(h.app.session.session().await.is_authenticated);

    let session = h.app.session.delete_account("123456".into()).await.unwrap();
    assert!(!session.is_authenticated);

    // A fresh start no longer restores the deleted session.
    let start = h.app.start_app.execute().await.unwrap();
    assert!(!start.is_authenticated);
}
