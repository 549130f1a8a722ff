use auth::JwtError;
use auth::PasswordError;
use thiserror::Error;

use crate::user::errors::UserError;

/// Error for session cache operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("Session cache unavailable: {0}")]
    Unavailable(String),

    #[error("Session cache timed out after {0} ms")]
    Timeout(u64),
}

/// Errors raised by the session manager (signup, signin, refresh).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("User already exists")]
    UserAlreadyExists,

    /// Shared by unknown-email and wrong-password so neither can be told apart.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No refresh token provided")]
    MissingRefreshToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error(transparent)]
    User(#[from] UserError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),

    #[error("Token generation failed: {0}")]
    Token(#[from] JwtError),

    #[error("Password processing failed: {0}")]
    Password(#[from] PasswordError),
}

/// Errors raised by the request gatekeeper.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Unauthorized - No access token provided")]
    MissingAccessToken,

    #[error("Unauthorized - Access token expired")]
    AccessTokenExpired,

    #[error("Unauthorized - Invalid access token")]
    InvalidAccessToken,

    #[error("Unauthorized - User not found")]
    UserNotFound,

    #[error("Access denied - {0} only")]
    Forbidden(String),

    #[error("Could not load authenticated user: {0}")]
    Lookup(#[from] UserError),
}
