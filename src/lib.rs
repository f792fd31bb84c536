//! # Session Auth
//!
//! Session authentication for a multi-tenant backend: account registration,
//! password login, rotating refresh tokens and logout.
//!
//! A session is a pair of credentials:
//!
//! - **Access token**: a short-lived HS256 JWT carrying the account id. It is
//!   never stored server-side and only stops working when it expires.
//! - **Refresh token**: a long-lived opaque random secret stored on the account.
//!   Each account holds at most one, and every successful refresh replaces it.
//!
//! ## Core Modules
//!
//! - [`auth`]: the [`SessionService`](auth::SessionService) and its password
//!   hashing and token signing collaborators
//! - [`db`]: the [`CredentialStore`](db::CredentialStore) trait with PostgreSQL
//!   and in-memory implementations
//! - [`config`]: environment-driven configuration
//!
//! ## Example
//!
//! ```no_run
//! use session_auth::auth::{LoginRequest, SessionService};
//! use session_auth::config::AuthConfig;
//! use session_auth::db::MemoryCredentialStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthConfig::from_env()?;
//!     let service = SessionService::from_config(Arc::new(MemoryCredentialStore::new()), &config);
//!
//!     let session = service
//!         .login(LoginRequest {
//!             email: "jane@example.com".to_string(),
//!             password: "Password1!".to_string(),
//!         })
//!         .await?;
//!     println!("Logged in as {}", session.account.email);
//!     Ok(())
//! }
//! ```

/// Session service, password hashing, and token signing.
pub mod auth;
pub use auth::{AuthError, AuthResult, Session, SessionService};

/// Environment-driven configuration.
pub mod config;

/// Credential store trait and implementations.
pub mod db;
