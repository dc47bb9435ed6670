//! History record and identity types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated principal
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id issued by the auth provider
    pub uid: String,
    /// Display name, if the provider has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Email address, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    /// Create identity from uid
    #[inline]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
        }
    }

    /// With display name
    #[inline]
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// With email
    #[inline]
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// One completed interview session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Record id
    pub id: Uuid,
    /// Company the interview targeted
    pub company: String,
    /// Question texts, in order
    pub questions: Vec<String>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record stamped now
    pub fn new(company: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company: company.into(),
            questions,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_as_plain_json() {
        let record = SessionRecord::new("Acme Corp", vec!["Why Acme?".to_string()]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["company"], "Acme Corp");
        assert_eq!(json["questions"][0], "Why Acme?");

        let back: SessionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn identity_builder() {
        let id = Identity::new("u-1").with_display_name("Ada").with_email("ada@example.com");
        assert_eq!(id.uid, "u-1");
        assert_eq!(id.display_name.as_deref(), Some("Ada"));
    }
}
