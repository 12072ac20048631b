//! Remote backup store port
//!
//! Per-user, per-domain JSON blob storage. Best-effort: any domain may be
//! absent, and the store is expected to provide last-write-wins semantics
//! per domain per user. Writes carry complete snapshots, never deltas.

use async_trait::async_trait;
use serde_json::Value;

use crate::backup::{BackupDomain, DomainSnapshots};
use crate::ids::UserId;

#[async_trait]
pub trait BackupStorePort: Send + Sync {
    /// Replace the stored payload for one domain.
    async fn write_domain(
        &self,
        user_id: &UserId,
        domain: BackupDomain,
        payload: Value,
    ) -> anyhow::Result<()>;

    /// Read whatever domains exist for the user. Partial presence allowed.
    async fn read_all_domains(&self, user_id: &UserId) -> anyhow::Result<DomainSnapshots>;
}
