use anyhow::Result;
use tracing::{debug, warn};

use crate::network::Network;
use crate::node::MinionNode;
use crate::outcome::{Confidence, DeliveryStatus, Resolution};
use crate::store::DirectoryStore;

impl<S: DirectoryStore + 'static, N: Network> MinionNode<S, N> {
    /// Work out which minion owns `receiver`.
    ///
    /// First match wins: our own users, then the receiver identifier on the
    /// latest `sender -> receiver` message, then the master. Cached answers
    /// are never invalidated; a user that moved keeps being routed to the old
    /// owner until a failed forward clears the cache.
    pub async fn resolve(&self, receiver: &str, sender: &str) -> Result<Resolution> {
        let username = receiver.to_string();
        if self.on_store(move |store| store.user_exists(&username)).await? {
            return Ok(Resolution::found(self.url_identifier(), Confidence::Local));
        }

        let (from, to) = (sender.to_string(), receiver.to_string());
        let previous = self
            .on_store(move |store| store.latest_message(&from, &to))
            .await?;
        if let Some(previous) = previous {
            if !previous.receiver_minion_url_identifier.is_empty() {
                debug!("Routing cache hit for {} -> {}", sender, receiver);
                return Ok(Resolution::found(
                    previous.receiver_minion_url_identifier,
                    Confidence::Cached,
                ));
            }
        }

        match self.network().lookup_owner(receiver).await {
            Ok(identifier) if !identifier.is_empty() => {
                Ok(Resolution::found(identifier, Confidence::Master))
            }
            Ok(_) => {
                warn!("Master does not know who owns {}", receiver);
                Ok(Resolution::unresolved(DeliveryStatus::Timeout))
            }
            Err(e) => {
                warn!("Master lookup for {} failed: {}", receiver, e);
                Ok(Resolution::unresolved(e.classify()))
            }
        }
    }
}
