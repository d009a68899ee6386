use serde::Serialize;

use crate::constants::{EMAIL_SUBJECT, NOTES_PLACEHOLDER, TREATMENT_PLACEHOLDER};
use crate::entities::contact::ContactSubmission;

/// Message handed to the email provider. Serializes to the provider's
/// `POST /emails` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { id: Option<String> },
    Rejected { reason: Option<String> },
}

impl OutgoingEmail {
    /// Builds the availability request notification sent to the spa.
    pub fn availability_request(submission: &ContactSubmission, from: &str, to: &str) -> Self {
        let treatment = or_placeholder(&submission.treatment, TREATMENT_PLACEHOLDER);
        let notes = or_placeholder(&submission.notes, NOTES_PLACEHOLDER);

        let text = [
            format!("Name: {}", submission.name),
            format!("Email: {}", submission.email),
            format!("Preferred treatment: {}", treatment),
            format!("Notes: {}", notes),
        ]
        .join("\n");

        let html = format!(
            "<h2>New availability request</h2>\n\
             <p><strong>Name:</strong> {}</p>\n\
             <p><strong>Email:</strong> {}</p>\n\
             <p><strong>Preferred treatment:</strong> {}</p>\n\
             <p><strong>Notes:</strong> {}</p>\n",
            escape_html(&submission.name),
            escape_html(&submission.email),
            escape_html(treatment),
            escape_html(notes),
        );

        OutgoingEmail {
            from: from.to_string(),
            to: vec![to.to_string()],
            reply_to: submission.email.clone(),
            subject: EMAIL_SUBJECT.to_string(),
            text,
            html,
        }
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

/// Escapes the five characters that matter inside HTML text and attributes.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
