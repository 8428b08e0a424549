//! Location resolution and forwarding between minions.
//!
//! A minion owns the users stored in its local database. To deliver a message
//! it works out which minion owns the recipient (local table, then the routing
//! cache carried on earlier messages, then the master), hands the message to
//! that minion's `/receive` endpoint and records the attempt either way.

pub mod forwarder;
pub mod network;
pub mod node;
pub mod outcome;
pub mod receiver;
pub mod registration;
pub mod resolver;
pub mod store;

pub use network::{HttpNetwork, Network, NetworkConfig, NetworkError, PEER_ID_PLACEHOLDER};
pub use node::{MinionNode, SendReport};
pub use outcome::{Confidence, DeliveryStatus, Resolution};
pub use registration::RegistrationError;
pub use store::DirectoryStore;
