use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode, header::CONTENT_TYPE};
use thiserror::Error;
use tracing::debug;

use minion_types::api::{OwnerLookupRequest, OwnerLookupResponse, RegisterMinionRequest};
use minion_types::models::Message;

use crate::outcome::DeliveryStatus;

#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("payload could not be encoded: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("remote answered {0}")]
    Status(u16),
}

impl NetworkError {
    /// Encoding problems are the caller's fault; everything else counts as a timeout.
    pub fn classify(&self) -> DeliveryStatus {
        match self {
            NetworkError::Invalid(_) => DeliveryStatus::Invalid,
            _ => DeliveryStatus::Timeout,
        }
    }
}

/// Outbound calls a minion makes: to the master and to peer minions.
pub trait Network: Send + Sync {
    /// `POST /registerMinion` on the master.
    fn register_minion(
        &self,
        name: &str,
        url_identifier: &str,
    ) -> impl Future<Output = Result<(), NetworkError>> + Send;

    /// `POST /retrieveMinionUrlIdentifier` on the master. May return an empty string.
    fn lookup_owner(&self, username: &str) -> impl Future<Output = Result<String, NetworkError>> + Send;

    /// `POST /receive` on the peer identified by `destination`.
    fn deliver(
        &self,
        destination: &str,
        message: &Message,
    ) -> impl Future<Output = Result<(), NetworkError>> + Send;
}

/// Placeholder replaced by the destination identifier in
/// [`NetworkConfig::peer_url_template`].
pub const PEER_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub master_url: String,
    /// Where a peer's `/receive` lives, with `{id}` standing for its identifier.
    pub peer_url_template: String,
    pub timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            master_url: "https://master.example.com".into(),
            peer_url_template: "https://{id}.minion.example.com/receive".into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// reqwest-backed [`Network`].
pub struct HttpNetwork {
    client: Client,
    config: NetworkConfig,
}

impl HttpNetwork {
    pub fn new(config: NetworkConfig) -> Result<Self, NetworkError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn peer_url(&self, destination: &str) -> String {
        self.config
            .peer_url_template
            .replace(PEER_ID_PLACEHOLDER, destination)
    }

    pub fn master_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.master_url.trim_end_matches('/'), path)
    }

    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<reqwest::Response, NetworkError> {
        debug!("POST {}", url);
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(NetworkError::Status(resp.status().as_u16()));
        }
        Ok(resp)
    }
}

impl Network for HttpNetwork {
    async fn register_minion(&self, name: &str, url_identifier: &str) -> Result<(), NetworkError> {
        let body = serde_json::to_vec(&RegisterMinionRequest {
            name: name.to_string(),
            url_identifier: url_identifier.to_string(),
        })?;
        self.post_json(&self.master_url("registerMinion"), body).await?;
        Ok(())
    }

    async fn lookup_owner(&self, username: &str) -> Result<String, NetworkError> {
        let body = serde_json::to_vec(&OwnerLookupRequest {
            username: username.to_string(),
        })?;
        let resp = self
            .post_json(&self.master_url("retrieveMinionUrlIdentifier"), body)
            .await?;
        let found: OwnerLookupResponse = resp.json().await?;
        Ok(found.receiver_minion_url_identifier)
    }

    async fn deliver(&self, destination: &str, message: &Message) -> Result<(), NetworkError> {
        let body = serde_json::to_vec(message)?;
        self.post_json(&self.peer_url(destination), body).await?;
        Ok(())
    }
}
