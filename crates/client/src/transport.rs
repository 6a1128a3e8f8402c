use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use specify_domain::model::{ImageFormat, PublisherKey, WalletAddress};

use crate::error::SpecifyError;

/// Wire payload POSTed to the resolution endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRequest {
    pub wallet_addresses: Vec<WalletAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_format: Option<ImageFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_unit_id: Option<String>,
}

/// Raw HTTP outcome handed to the resolver: status code plus undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Seam between request composition and response resolution. Swappable in
/// tests; production traffic goes through [`HttpTransport`]. Implementations
/// returning an error must return it as-is, never wrapped in another variant.
#[async_trait]
pub trait AdTransport: Send + Sync {
    async fn send(&self, request: &AdRequest) -> Result<RawResponse, SpecifyError>;
}

/// Default transport speaking JSON over HTTPS via reqwest. The publisher key
/// travels only in the `x-api-key` header.
pub struct HttpTransport {
    http: Client,
    endpoint: String,
    key: PublisherKey,
}

impl HttpTransport {
    pub fn new(base_url: &str, key: PublisherKey) -> Self {
        Self {
            http: Client::new(),
            endpoint: format!("{}/ads", base_url.trim_end_matches('/')),
            key,
        }
    }
}

#[async_trait]
impl AdTransport for HttpTransport {
    async fn send(&self, request: &AdRequest) -> Result<RawResponse, SpecifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header("x-api-key", self.key.as_str())
            .json(request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
