use std::sync::Arc;

use anyhow::{Result, anyhow};
use chrono::Utc;
use tracing::{debug, error, warn};

use minion_types::models::Message;

use crate::network::Network;
use crate::outcome::{Confidence, DeliveryStatus, Resolution};
use crate::store::DirectoryStore;

/// What happened to one outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub resolution: Resolution,
    pub status: DeliveryStatus,
}

/// Everything a request handler needs: the local directory, the outbound
/// client and who we are. Shared behind an `Arc` by the HTTP layer.
pub struct MinionNode<S, N> {
    store: Arc<S>,
    network: N,
    name: String,
    url_identifier: String,
}

impl<S: DirectoryStore + 'static, N: Network> MinionNode<S, N> {
    pub fn new(store: S, network: N, name: impl Into<String>, url_identifier: impl Into<String>) -> Self {
        Self::with_shared_store(Arc::new(store), network, name, url_identifier)
    }

    pub fn with_shared_store(
        store: Arc<S>,
        network: N,
        name: impl Into<String>,
        url_identifier: impl Into<String>,
    ) -> Self {
        Self {
            store,
            network,
            name: name.into(),
            url_identifier: url_identifier.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url_identifier(&self) -> &str {
        &self.url_identifier
    }

    /// Run blocking store work off the async runtime.
    pub async fn on_store<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&S) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                anyhow!("store task failed: {}", e)
            })?
    }

    pub(crate) async fn record(&self, message: Message) -> Result<()> {
        self.on_store(move |store| store.record_message(&message)).await
    }

    /// Resolve, forward and record one outgoing message.
    ///
    /// When nobody knows the owner no delivery is attempted; the message is
    /// still recorded, unresolved, so the next send retries resolution.
    pub async fn send(&self, sender: &str, receiver: &str, content: &str) -> Result<SendReport> {
        let message = Message {
            sender_name: sender.to_string(),
            receiver_name: receiver.to_string(),
            sender_minion_url_identifier: self.url_identifier.clone(),
            receiver_minion_url_identifier: String::new(),
            content: content.to_string(),
            created_at: Some(Utc::now()),
        };

        let resolution = self.resolve(receiver, sender).await?;
        debug!(
            "Resolved {} -> '{}' ({:?})",
            receiver, resolution.identifier, resolution.confidence
        );

        if let Confidence::Unresolved(status) = resolution.confidence {
            warn!("Could not resolve owner of {}, recording unresolved message", receiver);
            self.record(message).await?;
            return Ok(SendReport { resolution, status });
        }

        let status = self.forward(&resolution.identifier, message).await?;
        Ok(SendReport { resolution, status })
    }
}
