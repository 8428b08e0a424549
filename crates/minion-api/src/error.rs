use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use minion_types::api::StatusMessage;

/// Every failure a handler can report. None of them take the process down.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("faulty request")]
    MalformedRequest,
    #[error("invalid apikey")]
    InvalidApiKey,
    /// Unknown user or wrong password on login.
    #[error("{0}")]
    InvalidCredentials(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("could not resolve receiver")]
    ResolutionFailure,
    #[error("failed to get response from receiver")]
    ForwardFailure,
    #[error("invalid message")]
    InvalidMessage,
    #[error("receiver does not belong to this minion")]
    OwnershipMismatch,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest | ApiError::InvalidMessage => StatusCode::BAD_REQUEST,
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::InvalidCredentials(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ResolutionFailure | ApiError::ForwardFailure => StatusCode::REQUEST_TIMEOUT,
            ApiError::OwnershipMismatch => StatusCode::NOT_ACCEPTABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Error in reading json: {}", rejection.body_text());
        ApiError::MalformedRequest
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!("Request failed: {:#}", e);
        }
        (self.status(), Json(StatusMessage::message(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_http_surface() {
        assert_eq!(ApiError::MalformedRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::InvalidApiKey.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Conflict("username not available").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::ForwardFailure.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(ApiError::OwnershipMismatch.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("disk full")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = ApiError::Internal(anyhow::anyhow!("constraint failed: users.username"));
        assert_eq!(err.to_string(), "internal error");
    }
}
