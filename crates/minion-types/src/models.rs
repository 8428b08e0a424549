use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat message as it travels between minions and is stored locally.
///
/// `receiver_minion_url_identifier` doubles as the routing cache: an empty
/// value marks a message whose owner could not be resolved or reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub sender_name: String,
    pub receiver_name: String,
    #[serde(default)]
    pub sender_minion_url_identifier: String,
    #[serde(default)]
    pub receiver_minion_url_identifier: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Public view of a local user. Credentials never leave the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub client_url_identifier: String,
    pub created_at: DateTime<Utc>,
}

/// This process's identity as known to the master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Minion {
    pub name: String,
    pub url_identifier: String,
    pub acknowledged: bool,
}
