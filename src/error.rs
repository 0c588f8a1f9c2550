//!
//! # Custom Error Handling
//!
//! This module defines the error type `AppError` used throughout the application.
//! Its variants form the failure taxonomy of the service: every operation in the
//! auth core and the task use cases reports one of them, and the HTTP boundary
//! maps each onto a status class.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers and the
//! authorization middleware can return it directly. `From` implementations cover
//! the leaf error types (`TokenError`, `StoreError`, `sqlx::Error`,
//! `validator::ValidationErrors`) so `?` works across layers.
//!
//! Messages never carry a plaintext password, a password hash or a raw token.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input, such as a non-UUID identifier or a payload failing validation (400).
    #[error("Validation Error: {0}")]
    Validation(String),
    /// Registration with a username that already exists (409).
    #[error("Username already taken")]
    UsernameTaken,
    /// Unknown username or wrong password. Deliberately a single variant so the
    /// two cases cannot be told apart (401).
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The password hasher failed internally (500).
    #[error("Password hashing failed")]
    HashingFailed,
    /// No token was presented on a protected route (401).
    #[error("Authentication required")]
    AuthenticationRequired,
    /// The presented token is forged, expired or malformed (401).
    #[error("Invalid or expired token")]
    TokenInvalid,
    /// The token is valid but its role is not allowed on the route (403).
    #[error("Role not authorized")]
    AuthorizationDenied,
    /// A requested record does not exist (404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// The backing store failed (500).
    #[error("Persistence failure: {0}")]
    Persistence(String),
    /// Anything else that is the server's fault, e.g. token signing (500).
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the client. Server-side failures are reduced to a
    /// generic text; the detail is only logged.
    fn public_message(&self) -> String {
        match self {
            AppError::HashingFailed | AppError::Persistence(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::AuthenticationRequired
            | AppError::TokenInvalid => StatusCode::UNAUTHORIZED,
            AppError::AuthorizationDenied => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::HashingFailed | AppError::Persistence(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Every verification failure collapses into `TokenInvalid`; only a signing
/// failure (server misconfiguration) is reported as internal.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => AppError::Internal(format!("token signing failed: {msg}")),
            TokenError::InvalidSignature | TokenError::Expired | TokenError::Malformed => {
                AppError::TokenInvalid
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            StoreError::Conflict => AppError::Persistence("unique constraint violated".into()),
            StoreError::Backend(msg) => AppError::Persistence(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        StoreError::from(error).into()
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}
