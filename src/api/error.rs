use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use featurevote_core::Error as CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("Invalid user credentials.")]
    InvalidCredentials,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(err) => match err {
                CoreError::Validation(_)
                | CoreError::SelfVote
                | CoreError::DuplicateVote
                | CoreError::NoVote => StatusCode::BAD_REQUEST,
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Database(_) | CoreError::LockPoisoned => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidCredentials => "unauthenticated",
            ApiError::MalformedPayload(_) => "validation_error",
            ApiError::Core(err) => err.code(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store failures are logged in full but not echoed to the client.
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!(code = self.code(), "Request rejected: {}", self);
            self.to_string()
        };

        let body = ErrorBody {
            error: message,
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
