use anyhow::Result;
use tracing::{debug, warn};

use minion_types::models::Message;

use crate::network::Network;
use crate::node::MinionNode;
use crate::outcome::DeliveryStatus;
use crate::store::DirectoryStore;

impl<S: DirectoryStore + 'static, N: Network> MinionNode<S, N> {
    /// Hand `message` to the minion identified by `destination`, then record it.
    ///
    /// Our own identifier short-circuits to success without touching the
    /// network. The message is recorded whatever the outcome; on failure its
    /// receiver identifier is cleared so the routing cache does not reuse it.
    /// No retry is attempted.
    pub async fn forward(&self, destination: &str, mut message: Message) -> Result<DeliveryStatus> {
        message.receiver_minion_url_identifier = destination.to_string();

        let status = if destination == self.url_identifier() {
            DeliveryStatus::Success
        } else {
            match self.network().deliver(destination, &message).await {
                Ok(()) => {
                    debug!("Delivered message for {} to {}", message.receiver_name, destination);
                    DeliveryStatus::Success
                }
                Err(e) => {
                    warn!("Forward to {} failed: {}", destination, e);
                    e.classify()
                }
            }
        };

        if !status.is_success() {
            message.receiver_minion_url_identifier.clear();
        }

        self.record(message).await?;
        Ok(status)
    }
}
