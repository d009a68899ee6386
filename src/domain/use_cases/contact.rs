use serde::Serialize;

use crate::{
    entities::{
        contact::ContactRequest,
        email::{DispatchOutcome, OutgoingEmail},
    },
    errors::AppError,
    repositories::{
        mailer::Mailer,
        rate_limit::{RateDecision, RateLimiter},
    },
};

/// Body of a successful submission. Spam drops produce the same shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactAccepted {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ContactAccepted {
    fn new(id: Option<String>) -> Self {
        ContactAccepted { ok: true, id }
    }
}

/// Where notifications go and who they come from.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    pub recipient: Option<String>,
    pub sender: String,
    /// Echo the provider's message id back to the caller.
    pub expose_message_id: bool,
}

pub struct ContactHandler<M, L>
where
    M: Mailer,
    L: RateLimiter,
{
    pub mailer: Option<M>,
    pub limiter: L,
    pub delivery: DeliverySettings,
}

impl<M, L> ContactHandler<M, L>
where
    M: Mailer,
    L: RateLimiter,
{
    pub fn new(mailer: Option<M>, limiter: L, delivery: DeliverySettings) -> Self {
        ContactHandler { mailer, limiter, delivery }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some() && self.recipient().is_some()
    }

    fn recipient(&self) -> Option<&str> {
        self.delivery
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|to| !to.is_empty())
    }

    fn delivery_target(&self) -> Result<(&M, &str), AppError> {
        match (&self.mailer, self.recipient()) {
            (Some(mailer), Some(recipient)) => Ok((mailer, recipient)),
            (mailer, recipient) => {
                tracing::error!(
                    has_api_key = mailer.is_some(),
                    has_recipient = recipient.is_some(),
                    "Email service not configured"
                );
                Err(AppError::NotConfigured)
            }
        }
    }

    /// Configuration and rate-limit steps. Runs before any of the body is
    /// read, and counts the request against `client_key`.
    pub fn admit(&self, client_key: &str) -> Result<(), AppError> {
        self.delivery_target()?;

        if let RateDecision::Denied { retry_after } = self.limiter.check(client_key) {
            tracing::warn!(client = %client_key, "Contact rate limit exceeded");
            return Err(AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            });
        }
        Ok(())
    }

    /// Runs one contact submission through configuration, rate limiting,
    /// validation, the honeypot and finally the mailer. The first failing
    /// step decides the response.
    pub async fn submit(&self, client_key: &str, body: &[u8]) -> Result<ContactAccepted, AppError> {
        self.admit(client_key)?;
        self.deliver(client_key, body).await
    }

    /// Everything after `admit`: validation, the honeypot and dispatch.
    pub async fn deliver(&self, client_key: &str, body: &[u8]) -> Result<ContactAccepted, AppError> {
        let (mailer, recipient) = self.delivery_target()?;

        let submission = ContactRequest::from_json_bytes(body).validated()?;

        if submission.is_spam() {
            tracing::warn!(client = %client_key, "Honeypot field filled, dropping submission");
            return Ok(ContactAccepted::new(None));
        }

        let email = OutgoingEmail::availability_request(&submission, &self.delivery.sender, recipient);

        tracing::info!(from = %email.from, to = %recipient, reply_to = %email.reply_to, "Sending availability request");

        match mailer.send(&email).await {
            DispatchOutcome::Sent { id } => {
                tracing::info!(id = ?id, "Availability request sent");
                let id = if self.delivery.expose_message_id { id } else { None };
                Ok(ContactAccepted::new(id))
            }
            DispatchOutcome::Rejected { reason } => {
                tracing::error!(reason = ?reason, "Email dispatch failed");
                Err(AppError::Dispatch(
                    reason.unwrap_or_else(|| "Unknown error".to_string()),
                ))
            }
        }
    }
}
