//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use argon2::Params;
use chrono::Duration;
use session_auth::auth::{
    Argon2Hasher, JwtTokenSigner, LoginRequest, RefreshRequest, RegisterRequest, Session,
    SessionService,
};
use session_auth::config::JwtConfig;
use session_auth::db::MemoryCredentialStore;

pub const JWT_SECRET: &str = "test-secret-key-that-is-at-least-32-chars";
pub const PEPPER: &str = "test-pepper-0123";
pub const PASSWORD: &str = "Password1!";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: JWT_SECRET.to_string(),
        issuer: "session_auth".to_string(),
        audience: "session_auth_users".to_string(),
        access_token_minutes: 15,
    }
}

/// Argon2 with small parameters so tests stay fast
pub fn fast_hasher() -> Argon2Hasher {
    let params = Params::new(8 * 1024, 1, 1, None).expect("valid argon2 params");
    Argon2Hasher::with_params(PEPPER.to_string(), params)
}

/// Session service over a fresh in-memory store
pub fn setup() -> (SessionService, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let service = SessionService::new(
        store.clone(),
        Arc::new(fast_hasher()),
        Arc::new(JwtTokenSigner::new(&jwt_config())),
        Duration::days(7),
    );
    (service, store)
}

pub fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        phone: None,
    }
}

pub fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

pub fn refresh_request(session: &Session) -> RefreshRequest {
    RefreshRequest {
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
    }
}
