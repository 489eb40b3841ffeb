//! Contact form validation.
//!
//! Turns an untyped JSON payload into a [`ContactSubmission`], or collects every
//! field-level problem into [`ValidationErrors`]. Nothing here panics on odd
//! input; all failures come back as data so callers can report them per field.

use email_address::{EmailAddress, Options};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::contact::ContactSubmission;

/// Kind of constraint a field violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    /// Value present but not the expected JSON type.
    InvalidType,
    /// Required field absent or `null`.
    Missing,
    /// Required text empty or whitespace only.
    TooSmall,
    /// Email text without an address shape.
    InvalidEmail,
    /// Body could not be parsed as JSON at all.
    InvalidJson,
}

/// One field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Field path; empty for the payload root.
    pub path: Vec<String>,
    pub code: ViolationCode,
    pub message: String,
}

impl Violation {
    fn field(field: &str, code: ViolationCode, message: impl Into<String>) -> Self {
        Violation {
            path: vec![field.to_string()],
            code,
            message: message.into(),
        }
    }

    fn root(code: ViolationCode, message: impl Into<String>) -> Self {
        Violation {
            path: Vec::new(),
            code,
            message: message.into(),
        }
    }
}

/// Every violation found in a rejected payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("invalid form data ({} violation(s))", .violations.len())]
#[serde(transparent)]
pub struct ValidationErrors {
    pub violations: Vec<Violation>,
}

impl ValidationErrors {
    /// Rejection for a request body that was not JSON.
    pub fn malformed_body(detail: impl Into<String>) -> Self {
        ValidationErrors {
            violations: vec![Violation::root(ViolationCode::InvalidJson, detail)],
        }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validate an untyped payload into a submission.
pub fn validate_submission(payload: &Value) -> Result<ContactSubmission, ValidationErrors> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationErrors {
            violations: vec![Violation::root(
                ViolationCode::InvalidType,
                format!("Expected object, received {}", type_name(payload)),
            )],
        });
    };

    let mut violations = Vec::new();

    let name = required_text(object, "name", &mut violations);
    let email = required_text(object, "email", &mut violations);
    if let Some(email) = &email {
        if !is_bare_address(email) {
            violations.push(Violation::field(
                "email",
                ViolationCode::InvalidEmail,
                "Invalid email",
            ));
        }
    }
    let company = optional_text(object, "company", &mut violations);
    let message = required_text(object, "message", &mut violations);

    match (name, email, message) {
        (Some(name), Some(email), Some(message)) if violations.is_empty() => Ok(ContactSubmission {
            name,
            email,
            company,
            message,
        }),
        _ => Err(ValidationErrors { violations }),
    }
}

/// A plain `local@domain.tld` address: no display text, no IP literal, TLD required.
fn is_bare_address(email: &str) -> bool {
    let options = Options::default()
        .without_display_text()
        .without_domain_literal()
        .with_required_tld();
    EmailAddress::parse_with_options(email, options).is_ok()
}

fn required_text(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => {
            violations.push(Violation::field(field, ViolationCode::Missing, "Required"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            violations.push(Violation::field(
                field,
                ViolationCode::TooSmall,
                "String must contain at least 1 character(s)",
            ));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::field(
                field,
                ViolationCode::InvalidType,
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn optional_text(
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            violations.push(Violation::field(
                field,
                ViolationCode::InvalidType,
                format!("Expected string, received {}", type_name(other)),
            ));
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
