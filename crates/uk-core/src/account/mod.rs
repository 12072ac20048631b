//! Account domain models
//!
//! The locally persisted account record and the identity types attached to
//! it. The account is owned exclusively by the local store once created;
//! its `user_id` is the join key against the remote backup store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::ids::UserId;

/// Login identifier: an email or phone string.
///
/// Uniqueness and case/format normalization are the verification
/// provider's concern; the domain treats the value as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Scrubbed placeholder left behind by anonymization.
    pub fn redacted() -> Self {
        Self(String::new())
    }

    pub fn is_redacted(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Delivery channel for one-time codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
}

/// Why an account is being anonymized.
///
/// Deletion closes the account; withdrawal opts out of participation.
/// Both scrub the identifier and keep the data under its `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureMode {
    Deletion,
    Withdrawal,
}

/// User-entered profile fields.
///
/// A save replaces the whole record; a field update reads the current
/// record, merges via [`BusinessProfile::apply`], and re-saves the whole
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub cuisine: Option<String>,
    /// Remote reference to the uploaded profile image, if any.
    pub image_uri: Option<String>,
}

impl BusinessProfile {
    /// Merge an update into this record. `None` fields are left untouched.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(business_name) = update.business_name {
            self.business_name = Some(business_name);
        }
        if let Some(contact_name) = update.contact_name {
            self.contact_name = Some(contact_name);
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(postcode) = update.postcode {
            self.postcode = Some(postcode);
        }
        if let Some(cuisine) = update.cuisine {
            self.cuisine = Some(cuisine);
        }
        if let Some(image_uri) = update.image_uri {
            self.image_uri = Some(image_uri);
        }
    }
}

/// Partial profile change applied on top of the current record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub business_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub postcode: Option<String>,
    pub cuisine: Option<String>,
    pub image_uri: Option<String>,
}

/// Remote avatar image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub uri: String,
    pub updated_at: DateTime<Utc>,
}

/// Locally persisted account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub user_id: UserId,
    pub email: Identifier,
    pub created_at: DateTime<Utc>,
    pub has_completed_profile: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<BusinessProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymized_at: Option<DateTime<Utc>>,
}

impl UserAccount {
    pub fn new(user_id: UserId, email: Identifier, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            email,
            created_at,
            has_completed_profile: false,
            profile: None,
            avatar: None,
            anonymized_at: None,
        }
    }

    /// Irreversibly scrub the identifying field.
    ///
    /// `user_id` and all associated data are retained for audit and
    /// statistics; only the login identifier is lost.
    pub fn anonymize(&mut self, now: DateTime<Utc>) {
        self.email = Identifier::redacted();
        self.anonymized_at = Some(now);
    }

    pub fn is_anonymized(&self) -> bool {
        self.anonymized_at.is_some()
    }

    /// Whether this record belongs to the given login identifier.
    ///
    /// An anonymized record never matches, so a later login with the old
    /// identifier takes the new-account path.
    pub fn matches_identifier(&self, identifier: &Identifier) -> bool {
        !self.is_anonymized() && &self.email == identifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn account() -> UserAccount {
        UserAccount::new(
            UserId::new("u-1"),
            Identifier::from("a@x.com"),
            Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn anonymize_scrubs_email_and_keeps_user_id() {
        let mut account = account();
        let now = Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap();

        account.anonymize(now);

        assert!(account.email.is_redacted());
        assert_eq!(account.user_id, UserId::new("u-1"));
        assert_eq!(account.anonymized_at, Some(now));
    }

    #[test]
    fn anonymized_account_no_longer_matches_its_identifier() {
        let mut account = account();
        assert!(account.matches_identifier(&Identifier::from("a@x.com")));

        account.anonymize(Utc::now());

        assert!(!account.matches_identifier(&Identifier::from("a@x.com")));
    }

    #[test]
    fn profile_apply_merges_only_present_fields() {
        let mut profile = BusinessProfile {
            business_name: Some("The Green Fork".into()),
            contact_name: Some("Sam".into()),
            ..Default::default()
        };

        profile.apply(ProfileUpdate {
            postcode: Some("SW1A 1AA".into()),
            ..Default::default()
        });

        assert_eq!(profile.business_name.as_deref(), Some("The Green Fork"));
        assert_eq!(profile.contact_name.as_deref(), Some("Sam"));
        assert_eq!(profile.postcode.as_deref(), Some("SW1A 1AA"));
    }
}
