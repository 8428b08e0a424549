use axum::{Json, extract::State, extract::rejection::JsonRejection, response::IntoResponse};
use tracing::{info, warn};

use minion_routing::{Confidence, DeliveryStatus, store::message_from_row};
use minion_types::api::{ConversationRequest, SendRequest, StatusMessage};
use minion_types::models::Message;

use crate::auth::{AppState, verify_api_key, with_db};
use crate::error::ApiError;

/// POST /send: route a message from one of our users to wherever the
/// receiver lives.
pub async fn send(
    State(state): State<AppState>,
    payload: Result<Json<SendRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    verify_api_key(&state, &req.sender_name, &req.api_key).await?;

    let report = state
        .node
        .send(&req.sender_name, &req.receiver_name, &req.content)
        .await?;

    match (report.status, report.resolution.confidence) {
        (DeliveryStatus::Success, _) => {
            info!("Delivered {} -> {}", req.sender_name, req.receiver_name);
            Ok(Json(StatusMessage::message("Success")))
        }
        (DeliveryStatus::Invalid, _) => Err(ApiError::InvalidMessage),
        (_, Confidence::Unresolved(_)) => Err(ApiError::ResolutionFailure),
        _ => Err(ApiError::ForwardFailure),
    }
}

/// POST /receive: a peer hands us a message for one of our users.
pub async fn receive(
    State(state): State<AppState>,
    payload: Result<Json<Message>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(message) = payload?;

    match state.node.receive(message).await? {
        DeliveryStatus::Success => Ok(Json(StatusMessage::message("Success"))),
        DeliveryStatus::Invalid => Err(ApiError::InvalidMessage),
        DeliveryStatus::Rejected => Err(ApiError::OwnershipMismatch),
        DeliveryStatus::Timeout => Err(ApiError::ForwardFailure),
    }
}

/// POST /checkNewMessages: latest message `receiverName` sent to `username`.
pub async fn check_new_messages(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    verify_api_key(&state, &req.username, &req.api_key).await?;

    let latest = with_db(&state, move |db| {
        Ok(db
            .get_latest_message(&req.receiver_name, &req.username)?
            .map(message_from_row))
    })
    .await?;

    Ok(Json(latest))
}

/// POST /getUsersIChatWith
pub async fn users_i_chat_with(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    verify_api_key(&state, &req.username, &req.api_key).await?;

    let partners = with_db(&state, move |db| Ok(db.get_chat_partners(&req.username)?)).await?;

    Ok(Json(partners))
}

/// POST /getMessagesBetweenMeAndUser
pub async fn messages_between(
    State(state): State<AppState>,
    payload: Result<Json<ConversationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    verify_api_key(&state, &req.username, &req.api_key).await?;

    if req.receiver_name.is_empty() {
        warn!("getMessagesBetweenMeAndUser without receiverName");
        return Err(ApiError::MalformedRequest);
    }

    let messages: Vec<Message> = with_db(&state, move |db| {
        Ok(db
            .get_messages_between(&req.username, &req.receiver_name)?
            .into_iter()
            .map(message_from_row)
            .collect())
    })
    .await?;

    Ok(Json(messages))
}
