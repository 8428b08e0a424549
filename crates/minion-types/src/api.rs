use serde::{Deserialize, Serialize};

// -- Generic --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl StatusMessage {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            api_key: None,
        }
    }

    pub fn api_key(api_key: impl Into<String>) -> Self {
        Self {
            message: None,
            api_key: Some(api_key.into()),
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub client_url_identifier: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub api_key: String,
    pub sender_name: String,
    pub receiver_name: String,
    pub content: String,
}

/// Body shared by the conversation read endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    pub api_key: String,
    pub username: String,
    #[serde(default)]
    pub receiver_name: String,
}

// -- Master --

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMinionRequest {
    pub name: String,
    pub url_identifier: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerLookupRequest {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerLookupResponse {
    /// Masters built on untagged Go structs send the field capitalised.
    #[serde(alias = "ReceiverMinionUrlIdentifier")]
    pub receiver_minion_url_identifier: String,
}
