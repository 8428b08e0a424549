use axum::{
    Router,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::{directory, messages};

/// Every endpoint a minion serves. Layers are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/send", post(messages::send))
        .route("/receive", post(messages::receive))
        .route("/checkNewMessages", post(messages::check_new_messages))
        .route("/getUsersIChatWith", post(messages::users_i_chat_with))
        .route("/getMessagesBetweenMeAndUser", post(messages::messages_between))
        .route("/users", get(directory::users))
        .route("/messages", get(directory::messages))
        .route("/alive", get(directory::alive))
        .with_state(state)
}
