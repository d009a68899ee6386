use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::{
    constants::CONTACT_PATH,
    entities::contact::ContactRequest,
    errors::TransportError,
    repositories::contact_transport::{ContactTransport, TransportResponse},
};

/// Posts the contact form to a running contact service.
#[derive(Debug, Clone)]
pub struct HttpContactTransport {
    client: Client,
    endpoint: Url,
}

impl HttpContactTransport {
    pub fn new(client: Client, base_url: &str) -> Result<Self, TransportError> {
        let endpoint = Url::parse(base_url)?.join(CONTACT_PATH)?;
        Ok(HttpContactTransport { client, endpoint })
    }
}

#[async_trait]
impl ContactTransport for HttpContactTransport {
    async fn post_contact(&self, request: &ContactRequest) -> Result<TransportResponse, TransportError> {
        let response = self.client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response
            .json::<Value>()
            .await
            .unwrap_or_else(|_| Value::Object(Default::default()));

        Ok(TransportResponse { status, body })
    }
}
