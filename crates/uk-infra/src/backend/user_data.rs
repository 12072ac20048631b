//! HTTP adapter for the per-user backup store.
//!
//! The user-data API stores one JSON blob per (user, domain):
//! `PUT/GET /user-data/{userId}/{dataType}`, dataType one of
//! `profile | history | settings`. A 404 on read means "no backup".

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use uk_core::backup::{BackupDomain, DomainSnapshots};
use uk_core::ids::UserId;
use uk_core::ports::BackupStorePort;

use super::BackendConfig;

pub struct HttpBackupStore {
    client: Client,
    config: BackendConfig,
}

impl HttpBackupStore {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build http client")?;
        Ok(Self { client, config })
    }

    fn domain_url(&self, user_id: &UserId, domain: BackupDomain) -> String {
        format!(
            "{}/user-data/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            user_id,
            domain
        )
    }

    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }

    async fn read_domain(&self, user_id: &UserId, domain: BackupDomain) -> Result<Option<Value>> {
        let request = self.client.get(self.domain_url(user_id, domain));
        let response = self
            .with_api_key(request)
            .send()
            .await
            .with_context(|| format!("user-data read request failed for {domain}"))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let payload = response
                    .json()
                    .await
                    .with_context(|| format!("user-data payload unreadable for {domain}"))?;
                Ok(Some(payload))
            }
            status => Err(anyhow!("user-data read for {domain} returned {status}")),
        }
    }
}

#[async_trait]
impl BackupStorePort for HttpBackupStore {
    async fn write_domain(
        &self,
        user_id: &UserId,
        domain: BackupDomain,
        payload: Value,
    ) -> Result<()> {
        let request = self.client.put(self.domain_url(user_id, domain));
        let response = self
            .with_api_key(request)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("user-data write request failed for {domain}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("user-data write for {domain} returned {status}"));
        }

        debug!(user_id = %user_id, domain = %domain, "backup domain uploaded");
        Ok(())
    }

    async fn read_all_domains(&self, user_id: &UserId) -> Result<DomainSnapshots> {
        Ok(DomainSnapshots {
            profile: self.read_domain(user_id, BackupDomain::Profile).await?,
            history: self.read_domain(user_id, BackupDomain::History).await?,
            settings: self.read_domain(user_id, BackupDomain::Settings).await?,
        })
    }
}
