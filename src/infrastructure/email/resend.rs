use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::{
    entities::email::{DispatchOutcome, OutgoingEmail},
    repositories::mailer::Mailer,
};

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

/// Mailer backed by the Resend HTTP API.
#[derive(Clone)]
pub struct ResendMailer {
    client: Client,
    api_key: Zeroizing<String>,
    endpoint: Url,
}

impl ResendMailer {
    pub fn new(client: Client, api_key: Zeroizing<String>, base_url: &Url) -> Result<Self, url::ParseError> {
        let endpoint = base_url.join("emails")?;
        Ok(ResendMailer { client, api_key, endpoint })
    }
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> DispatchOutcome {
        let response = match self.client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.as_str())
            .json(email)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Resend request failed: {}", e);
                return DispatchOutcome::Rejected { reason: Some(e.to_string()) };
            }
        };

        let status = response.status();
        if status.is_success() {
            let id = response
                .json::<SendResponse>()
                .await
                .ok()
                .and_then(|body| body.id);
            return DispatchOutcome::Sent { id };
        }

        let reason = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(|body| body.message)
            .filter(|m| !m.trim().is_empty());

        tracing::warn!(status = status.as_u16(), reason = ?reason, "Resend rejected email");
        DispatchOutcome::Rejected { reason }
    }
}
