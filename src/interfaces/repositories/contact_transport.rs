use async_trait::async_trait;
use serde_json::Value;

use crate::{entities::contact::ContactRequest, errors::TransportError};

/// What came back from the contact endpoint. `body` is `{}` when the
/// response was not JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

#[async_trait]
pub trait ContactTransport: Send + Sync {
    async fn post_contact(&self, request: &ContactRequest) -> Result<TransportResponse, TransportError>;
}
