//! Authentication module providing registration, login, and session rotation.
//!
//! This module implements session authentication with:
//! - Argon2id password hashing with server-side pepper
//! - HS256 JWT access tokens (15-minute expiry by default)
//! - Opaque refresh tokens (7-day expiry by default), one per account,
//!   rotated on every use with a compare-and-swap at the store
//!
//! ## Example
//!
//! ```no_run
//! use session_auth::auth::{RefreshRequest, RegisterRequest, SessionService};
//! use session_auth::config::AuthConfig;
//! use session_auth::db::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()?).await?;
//!     db.migrate().await?;
//!     let auth = SessionService::from_config(Arc::new(db.credential_store()), &AuthConfig::from_env()?);
//!
//!     let session = auth
//!         .register(RegisterRequest {
//!             email: "Jane@Example.com".to_string(),
//!             password: "Password1!".to_string(),
//!             first_name: "Jane".to_string(),
//!             last_name: "Doe".to_string(),
//!             phone: None,
//!         })
//!         .await?;
//!
//!     let rotated = auth
//!         .refresh(RefreshRequest {
//!             access_token: session.access_token,
//!             refresh_token: session.refresh_token,
//!         })
//!         .await?;
//!
//!     auth.logout(rotated.account.id).await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use models::{
    AccessTokenClaims, Account, AccountId, AccountSummary, LoginRequest, NewAccount,
    RefreshRequest, RefreshSession, RegisterRequest, Session, normalize_email,
};
pub use password::{Argon2Hasher, PasswordHasher};
pub use service::SessionService;
pub use token::{JwtTokenSigner, TokenSigner};
