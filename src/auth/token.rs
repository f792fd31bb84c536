//! Access token signing and refresh secret generation.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use uuid::Uuid;

use super::{
    errors::{AuthError, AuthResult},
    models::{AccessTokenClaims, Account},
};
use crate::config::JwtConfig;

/// The only algorithm access tokens are signed or accepted with.
pub const ACCESS_TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Bytes of entropy in a refresh secret
pub const REFRESH_SECRET_BYTES: usize = 64;

/// Clock skew tolerated when checking `exp`/`nbf` (seconds)
pub const CLOCK_SKEW_SECS: u64 = 30;

/// Issues and validates session credentials
pub trait TokenSigner: Send + Sync {
    /// Sign a short-lived access token for `account`
    fn issue_access_token(&self, account: &Account) -> AuthResult<String>;

    /// Generate a fresh opaque refresh secret
    fn issue_refresh_secret(&self) -> String;

    /// Validate signature, algorithm, issuer and audience but not expiry.
    ///
    /// Used by refresh, where the access token is expected to have expired.
    fn decode_ignoring_expiry(&self, token: &str) -> AuthResult<AccessTokenClaims>;

    /// Fully validate an access token, expiry included
    fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims>;
}

/// HS256 JWT signer
#[derive(Clone)]
pub struct JwtTokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    access_token_duration: Duration,
}

impl JwtTokenSigner {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_token_duration: Duration::minutes(config.access_token_minutes),
        }
    }

    fn sign(&self, claims: &AccessTokenClaims) -> AuthResult<String> {
        encode(&Header::new(ACCESS_TOKEN_ALGORITHM), claims, &self.encoding_key)
            .map_err(AuthError::TokenEncoding)
    }

    fn decode_with(&self, token: &str, check_expiry: bool) -> AuthResult<AccessTokenClaims> {
        let mut validation = Validation::new(ACCESS_TOKEN_ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = check_expiry;
        validation.validate_nbf = check_expiry;
        validation.leeway = CLOCK_SKEW_SECS;

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| {
                log::debug!("Access token rejected: {err}");
                AuthError::InvalidToken
            })
    }
}

impl TokenSigner for JwtTokenSigner {
    fn issue_access_token(&self, account: &Account) -> AuthResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            given_name: account.first_name.clone(),
            family_name: account.last_name.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.access_token_duration).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        self.sign(&claims)
    }

    fn issue_refresh_secret(&self) -> String {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn decode_ignoring_expiry(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.decode_with(token, false)
    }

    fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.decode_with(token, true)
    }
}
