use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::constants::{
    MAX_COMPANY_LENGTH, MAX_EMAIL_LENGTH, MAX_NAME_LENGTH, MAX_NOTES_LENGTH, MAX_TREATMENT_LENGTH,
};
use crate::errors::ValidationFailure;

/// Permissive on purpose: something, an `@`, something, a dot, something.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\S+@\S+\.\S+").expect("email pattern is a valid regex")
});

/// Wire payload posted by the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub treatment: String,
    pub notes: String,
    pub company_field: String,
}

/// A request that passed validation. Every field is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ContactSubmission {
    #[validate(length(max = MAX_NAME_LENGTH))]
    pub name: String,

    #[validate(length(max = MAX_EMAIL_LENGTH))]
    pub email: String,

    #[validate(length(max = MAX_TREATMENT_LENGTH))]
    pub treatment: String,

    #[validate(length(max = MAX_NOTES_LENGTH))]
    pub notes: String,

    #[validate(length(max = MAX_COMPANY_LENGTH))]
    pub company_field: String,
}

impl ContactRequest {
    /// Decodes a request body leniently. Anything that is not a JSON object
    /// becomes an empty request, which then fails the identity check.
    pub fn from_json_bytes(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self::from_object(&map),
            _ => Self::default(),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Self {
        let company_field = match string_field(map, "company_field") {
            value if value.is_empty() => string_field(map, "company"),
            value => value,
        };

        ContactRequest {
            name: string_field(map, "name"),
            email: string_field(map, "email"),
            treatment: string_field(map, "treatment"),
            notes: string_field(map, "notes"),
            company_field,
        }
    }

    /// Applies the contact schema. Name and email are checked before any
    /// length limit, so an empty name wins over an oversized note.
    pub fn validated(&self) -> Result<ContactSubmission, ValidationFailure> {
        let submission = ContactSubmission {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            treatment: self.treatment.trim().to_string(),
            notes: self.notes.trim().to_string(),
            company_field: self.company_field.trim().to_string(),
        };

        if submission.name.is_empty()
            || submission.email.is_empty()
            || !is_valid_email(&submission.email)
        {
            return Err(ValidationFailure::MissingIdentity);
        }

        submission
            .validate()
            .map_err(|_| ValidationFailure::TooLong)?;

        Ok(submission)
    }
}

impl ContactSubmission {
    /// Honeypot check. Real visitors never see the company field.
    pub fn is_spam(&self) -> bool {
        !self.company_field.is_empty()
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    match map.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
