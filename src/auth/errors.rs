//! Authentication error types.

use thiserror::Error;

use crate::db::StoreError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email already registered
    #[error("Email is already registered")]
    Conflict,

    /// Unknown email or wrong password. Deliberately the same error for both.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials are correct but the account has been deactivated
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// Access token failed signature, algorithm, issuer, audience or subject checks
    #[error("Invalid access token")]
    InvalidToken,

    /// Refresh token does not match the stored one, or has expired
    #[error("Refresh token is invalid or expired")]
    InvalidOrExpiredRefreshToken,

    /// Request failed input validation
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Account not found (administrative operations only)
    #[error("Account not found")]
    AccountNotFound,

    /// Credential store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Access token could not be encoded
    #[error("Token encoding failed: {0}")]
    TokenEncoding(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// True for errors caused by the caller's input or credentials.
    ///
    /// Everything else is an infrastructure failure the transport layer may retry.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            AuthError::Store(_) | AuthError::HashingFailed | AuthError::TokenEncoding(_)
        )
    }

    /// HTTP status the boundary layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::Conflict => 409,
            AuthError::InvalidCredentials => 401,
            AuthError::AccountDeactivated => 403,
            AuthError::InvalidToken => 401,
            AuthError::InvalidOrExpiredRefreshToken => 401,
            AuthError::Validation(_) => 400,
            AuthError::AccountNotFound => 404,
            AuthError::Store(_) => 503,
            AuthError::HashingFailed | AuthError::TokenEncoding(_) => 500,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store and token errors are sanitized to prevent information disclosure
    /// about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Store(_) => "Service temporarily unavailable".to_string(),
            AuthError::HashingFailed | AuthError::TokenEncoding(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
