use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned contact identifier. Strictly increasing within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub u64);

impl ContactId {
    pub fn next(self) -> ContactId {
        ContactId(self.0 + 1)
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated contact form submission that has not been persisted yet.
///
/// Only produced by [`crate::validation::validate_submission`], so `name`,
/// `email` and `message` are never blank and `email` has an address shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default, with = "empty_as_none")]
    pub company: Option<String>,
    pub message: String,
}

impl ContactSubmission {
    /// Company for display, falling back to a placeholder.
    pub fn company_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.company.as_deref().unwrap_or(placeholder)
    }
}

/// A persisted submission. Records are append-only: nothing updates or
/// deletes one after the store hands it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    #[serde(default, with = "empty_as_none")]
    pub company: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContactRecord {
    pub fn from_submission(
        id: ContactId,
        submission: ContactSubmission,
        created_at: DateTime<Utc>,
    ) -> Self {
        ContactRecord {
            id,
            name: submission.name,
            email: submission.email,
            company: submission.company,
            message: submission.message,
            created_at,
        }
    }

    /// True when every field except `id` and `created_at` matches.
    pub fn same_content(&self, other: &ContactRecord) -> bool {
        self.name == other.name
            && self.email == other.email
            && self.company == other.company
            && self.message == other.message
    }
}

/// Absent company goes on the wire as `""`, and `""` reads back as absent.
mod empty_as_none {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}
