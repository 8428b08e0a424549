use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use minion_db::models::UserRow;
use minion_db::{Database, format_timestamp};
use minion_routing::{HttpNetwork, MinionNode};
use minion_types::api::{LoginRequest, RegisterRequest, StatusMessage};

use crate::error::ApiError;

pub type MinionService = MinionNode<Database, HttpNetwork>;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub node: MinionService,
    /// When false every API key is accepted, matching the deployed minions.
    pub enforce_api_keys: bool,
}

impl AppStateInner {
    pub fn db(&self) -> &Database {
        self.node.store()
    }
}

/// Run blocking DB work off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(state.db()))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e))
        })?
}

const MAX_USERNAME_LEN: usize = 64;

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let username_len = req.username.chars().count();
    if username_len == 0 || username_len > MAX_USERNAME_LEN || req.password.is_empty() {
        return Err(ApiError::MalformedRequest);
    }

    let username = req.username.clone();
    if with_db(&state, move |db| Ok(db.get_user_by_username(&username)?))
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("username not available"));
    }

    // Argon2 is deliberately slow; keep it off the async workers
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
        .map_err(|e| {
            error!("Error in generating password hash: {}", e);
            ApiError::Conflict("invalid password")
        })?;

    let user = UserRow {
        id: Uuid::new_v4().to_string(),
        username: req.username,
        password: password_hash,
        api_key: generate_api_key(),
        client_url_identifier: req.client_url_identifier,
        created_at: format_timestamp(Utc::now()),
    };

    let username = user.username.clone();
    // Lost a race with a concurrent registration of the same name
    with_db(&state, move |db| {
        db.create_user(&user).map_err(|e| {
            warn!("Could not create user {}: {}", user.username, e);
            ApiError::Conflict("username not available")
        })
    })
    .await?;

    info!("Registered user {}", username);
    Ok((StatusCode::CREATED, Json(StatusMessage::message("user created"))))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;

    let username = req.username.clone();
    let user = with_db(&state, move |db| Ok(db.get_user_by_username(&username)?))
        .await?
        .ok_or(ApiError::InvalidCredentials("no such user"))?;

    let stored = user.password.clone();
    let password = req.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?;

    if !verified {
        warn!("Password mismatch for {}", user.username);
        return Err(ApiError::InvalidCredentials("invalid password"));
    }

    Ok(Json(StatusMessage::api_key(user.api_key)))
}

/// Check `api_key` against the key stored for `username`.
///
/// Deployed minions accept any key; real verification is opt-in through
/// `enforce_api_keys` and requires `username` to be one of our users.
pub async fn verify_api_key(state: &AppState, username: &str, api_key: &str) -> Result<(), ApiError> {
    if !state.enforce_api_keys {
        return Ok(());
    }

    let name = username.to_string();
    match with_db(state, move |db| Ok(db.get_user_by_username(&name)?)).await? {
        Some(user) if !api_key.is_empty() && user.api_key == api_key => Ok(()),
        _ => {
            warn!("Rejected api key for {}", username);
            Err(ApiError::InvalidApiKey)
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Stored password hash is unreadable: {}", e);
            false
        }
    }
}

/// 256 random bits, URL-safe base64.
pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    B64.encode(bytes)
}
