use thiserror::Error;
use tracing::{info, warn};

use minion_types::models::Minion;

use crate::network::{Network, NetworkError};
use crate::node::MinionNode;
use crate::store::DirectoryStore;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("local identity could not be stored: {0}")]
    Store(#[from] anyhow::Error),
    #[error("master rejected or did not answer the registration: {0}")]
    Master(#[from] NetworkError),
}

impl<S: DirectoryStore + 'static, N: Network> MinionNode<S, N> {
    /// Make sure the master knows about this minion under its configured
    /// identifier.
    ///
    /// Creates the local identity row on first start and registers with the
    /// master until it has acknowledged us once. The acknowledgement is
    /// persisted, so later calls (and restarts) make no outbound request.
    /// A stored identifier that no longer matches the configured one drops
    /// the acknowledgement, so the master learns where we moved.
    pub async fn ensure_registered(&self) -> Result<Minion, RegistrationError> {
        let (name, url_identifier) = (self.name().to_string(), self.url_identifier().to_string());
        let mut minion = self
            .on_store(move |store| match store.find_minion(&name)? {
                Some(existing) if existing.url_identifier != url_identifier => {
                    warn!(
                        "Stored identifier '{}' differs from configured '{}', registering again",
                        existing.url_identifier, url_identifier
                    );
                    store.reset_minion(&name, &url_identifier)?;
                    Ok(Minion {
                        url_identifier,
                        acknowledged: false,
                        ..existing
                    })
                }
                Some(existing) => Ok(existing),
                None => {
                    info!("Creating local identity for minion {}", name);
                    store.create_minion(&name, &url_identifier)
                }
            })
            .await?;

        if minion.acknowledged {
            return Ok(minion);
        }

        info!("Registering minion {} with master", self.name());
        self.network()
            .register_minion(self.name(), self.url_identifier())
            .await?;

        let name = self.name().to_string();
        self.on_store(move |store| store.acknowledge_minion(&name)).await?;
        minion.acknowledged = true;
        info!("Master acknowledged minion {}", self.name());
        Ok(minion)
    }
}
