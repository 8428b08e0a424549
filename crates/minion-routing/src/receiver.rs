use anyhow::Result;
use chrono::Utc;
use tracing::{debug, warn};

use minion_types::models::Message;

use crate::network::Network;
use crate::node::MinionNode;
use crate::outcome::DeliveryStatus;
use crate::store::DirectoryStore;

impl<S: DirectoryStore + 'static, N: Network> MinionNode<S, N> {
    /// Accept a message forwarded by a peer.
    ///
    /// Only recipients stored here are accepted. Accepted messages go through
    /// [`MinionNode::forward`] addressed to ourselves, which records them
    /// without a second network hop.
    pub async fn receive(&self, mut message: Message) -> Result<DeliveryStatus> {
        if message.sender_name.is_empty()
            || message.receiver_name.is_empty()
            || message.sender_minion_url_identifier.is_empty()
        {
            warn!("Rejecting inbound message with missing routing fields");
            return Ok(DeliveryStatus::Invalid);
        }

        let receiver = message.receiver_name.clone();
        if !self.on_store(move |store| store.user_exists(&receiver)).await? {
            warn!(
                "Inbound message for {} from {} but the user is not ours",
                message.receiver_name, message.sender_minion_url_identifier
            );
            return Ok(DeliveryStatus::Rejected);
        }

        if message.created_at.is_none() {
            message.created_at = Some(Utc::now());
        }

        debug!(
            "Accepting message {} -> {} from {}",
            message.sender_name, message.receiver_name, message.sender_minion_url_identifier
        );
        let own = self.url_identifier().to_string();
        self.forward(&own, message).await
    }
}
