use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable per-account identifier.
///
/// Assigned exactly once when the account is created (from the provider's
/// stable id when available, generated otherwise) and never reassigned.
/// Every backup read/write keys off this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for accounts whose provider issued none.
    pub fn generate() -> Self {
        UserId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::UserId;

    #[test]
    fn generate_produces_distinct_ids() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn new_keeps_provider_id_verbatim() {
        let id = UserId::new("provider-42");
        assert_eq!(id.as_str(), "provider-42");
    }
}
