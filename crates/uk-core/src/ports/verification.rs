//! Identity verification provider port
//!
//! One-time-code delivery and verification are an external capability; the
//! hosting application injects the concrete provider at construction.

use async_trait::async_trait;

use crate::account::{Channel, Identifier};

/// Outcome of a code verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub success: bool,
    /// Provider-issued stable user id, when the provider has one.
    pub provider_user_id: Option<String>,
}

#[async_trait]
pub trait VerificationPort: Send + Sync {
    /// Deliver a one-time code over the given channel.
    async fn send_code(&self, identifier: &Identifier, channel: Channel) -> anyhow::Result<bool>;

    /// Verify a submitted code.
    async fn verify_code(
        &self,
        identifier: &Identifier,
        code: &str,
        channel: Channel,
    ) -> anyhow::Result<VerifyOutcome>;

    /// Tear down the provider-side session.
    async fn logout(&self) -> anyhow::Result<()>;

    /// Deliver the deletion-confirmation code.
    async fn send_delete_code(&self, identifier: &Identifier) -> anyhow::Result<bool>;

    /// Verify the deletion-confirmation code.
    async fn verify_delete_code(&self, identifier: &Identifier, code: &str)
        -> anyhow::Result<bool>;
}
