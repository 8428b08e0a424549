use axum::{Json, extract::State, response::IntoResponse};
use tracing::warn;

use minion_db::parse_timestamp;
use minion_routing::store::message_from_row;
use minion_types::api::StatusMessage;
use minion_types::models::{Message, User};

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

/// GET /users: everyone registered on this minion, without credentials.
pub async fn users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = with_db(&state, |db| Ok(db.list_users()?)).await?;

    let users: Vec<User> = rows
        .into_iter()
        .map(|row| User {
            created_at: parse_timestamp(&row.created_at).unwrap_or_else(|| {
                warn!("Corrupt created_at '{}' on user '{}'", row.created_at, row.username);
                chrono::DateTime::default()
            }),
            username: row.username,
            client_url_identifier: row.client_url_identifier,
        })
        .collect();

    Ok(Json(users))
}

/// GET /messages
pub async fn messages(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let messages: Vec<Message> = with_db(&state, |db| {
        Ok(db.list_messages()?.into_iter().map(message_from_row).collect())
    })
    .await?;

    Ok(Json(messages))
}

/// GET /alive
pub async fn alive() -> impl IntoResponse {
    Json(StatusMessage::message("alive"))
}
