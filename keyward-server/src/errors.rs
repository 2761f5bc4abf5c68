use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use keyward_core::{AccountError, RoleError, SessionError};
use std::fmt;
use tracing::error;

use crate::{api_response::ApiResponse, validation::ValidationError};

pub type AppResult<T> = Result<T, AppError>;

/// Message returned for both unknown users and wrong passwords.
pub const BAD_CREDENTIALS: &str = "invalid username or password";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_credentials() -> Self {
        Self::unauthorized(BAD_CREDENTIALS)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.message));
        (self.status, body).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyExists => Self::conflict(err.to_string()),
            AccountError::NotFound => Self::not_found(err.to_string()),
            AccountError::Hashing(source) => {
                error!(error = %source, "password hashing failed");
                Self::internal("password hashing failed")
            }
        }
    }
}

impl From<RoleError> for AppError {
    fn from(err: RoleError) -> Self {
        match err {
            RoleError::AlreadyExists => Self::conflict(err.to_string()),
            RoleError::NotFound => Self::not_found(err.to_string()),
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Minting(source) => {
                error!(error = %source, "session token minting failed");
                Self::internal("could not issue session")
            }
            SessionError::ExpiryOutOfRange => {
                error!("session expiry overflowed the configured lifetime");
                Self::internal("could not issue session")
            }
            other => Self::unauthorized(other.to_string()),
        }
    }
}
