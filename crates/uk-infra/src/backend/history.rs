//! HTTP adapter for the history service.
//!
//! History is owned by the backend and fetched per identifier; entries are
//! deserialized into owned domain values at this boundary, never aliased.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use uk_core::history::AnalysisEntry;
use uk_core::ports::HistoryServicePort;
use uk_core::Identifier;

use super::BackendConfig;

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    entries: Vec<AnalysisEntry>,
}

pub struct HttpHistoryService {
    client: Client,
    config: BackendConfig,
}

impl HttpHistoryService {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build http client")?;
        Ok(Self { client, config })
    }

    fn history_url(&self, identifier: &Identifier) -> String {
        format!(
            "{}/history/{}",
            self.config.base_url.trim_end_matches('/'),
            identifier
        )
    }
}

#[async_trait]
impl HistoryServicePort for HttpHistoryService {
    async fn get_history(&self, identifier: &Identifier) -> Result<Vec<AnalysisEntry>> {
        let mut request = self.client.get(self.history_url(identifier));
        if let Some(key) = &self.config.api_key {
            request = request.header("x-api-key", key);
        }
        let response = request
            .send()
            .await
            .context("history request failed")?;

        match response.status() {
            // An unknown identifier simply has no history yet.
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status if status.is_success() => {
                let body: HistoryResponse = response
                    .json()
                    .await
                    .context("history payload unreadable")?;
                Ok(body.entries)
            }
            status => Err(anyhow!("history request returned {status}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(server: &mockito::ServerGuard) -> HttpHistoryService {
        HttpHistoryService::new(BackendConfig::new(server.url())).unwrap()
    }

    #[tokio::test]
    async fn entries_are_decoded_newest_first() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/history/a@x.com")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"entries":[
                    {"id":"h2","kind":"video","captured_at":"2026-03-02T08:00:00Z","job_id":"job-2"},
                    {"id":"h1","kind":"image","captured_at":"2026-03-01T08:00:00Z"}
                ]}"#,
            )
            .create_async()
            .await;

        let entries = service(&server)
            .get_history(&Identifier::from("a@x.com"))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "h2");
        assert_eq!(entries[0].job_id.as_deref(), Some("job-2"));
    }

    #[tokio::test]
    async fn unknown_identifier_yields_an_empty_history() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/history/new@x.com")
            .with_status(404)
            .create_async()
            .await;

        let entries = service(&server)
            .get_history(&Identifier::from("new@x.com"))
            .await
            .unwrap();

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn server_error_propagates_to_the_caller() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/history/a@x.com")
            .with_status(502)
            .create_async()
            .await;

        let result = service(&server)
            .get_history(&Identifier::from("a@x.com"))
            .await;

        assert!(result.is_err());
    }
}
