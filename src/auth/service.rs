//! Session service implementation.

use std::sync::Arc;

use chrono::{Duration, Utc};

use super::{
    errors::{AuthError, AuthResult},
    models::{
        Account, AccountId, LoginRequest, NewAccount, RefreshRequest, RefreshSession,
        RegisterRequest, Session, normalize_email,
    },
    password::{Argon2Hasher, PasswordHasher},
    token::{JwtTokenSigner, TokenSigner},
};
use crate::config::AuthConfig;
use crate::db::{CredentialStore, StoreError, UpdateCondition};

/// Maximum email length accepted
pub const MAX_EMAIL_LEN: usize = 256;

/// Maximum first/last name length accepted
pub const MAX_NAME_LEN: usize = 100;

/// Maximum phone number length accepted
pub const MAX_PHONE_LEN: usize = 20;

/// Orchestrates registration, login, refresh and logout.
///
/// Holds no per-request state; clones share the same collaborators.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn CredentialStore>,
    hasher: Arc<dyn PasswordHasher>,
    signer: Arc<dyn TokenSigner>,
    refresh_token_duration: Duration,
}

impl SessionService {
    /// Create a new session service
    ///
    /// # Arguments
    ///
    /// * `store` - Account storage
    /// * `hasher` - Password hasher
    /// * `signer` - Access token signer and refresh secret generator
    /// * `refresh_token_duration` - Lifetime of each issued refresh token
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn PasswordHasher>,
        signer: Arc<dyn TokenSigner>,
        refresh_token_duration: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            signer,
            refresh_token_duration,
        }
    }

    /// Create a session service with the Argon2 hasher and JWT signer described by `config`
    pub fn from_config(store: Arc<dyn CredentialStore>, config: &AuthConfig) -> Self {
        Self::new(
            store,
            Arc::new(Argon2Hasher::new(config.password_pepper.clone())),
            Arc::new(JwtTokenSigner::new(&config.jwt)),
            Duration::days(config.refresh_token_days),
        )
    }

    /// Register a new account and open its first session
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Malformed email, empty password or names
    /// * `AuthError::Conflict` - Email (after normalization) already registered
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<Session> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;
        let first_name = validate_name("First name", &request.first_name)?;
        let last_name = validate_name("Last name", &request.last_name)?;
        let phone = normalize_phone(request.phone.as_deref())?;

        // Fast path only; the store's unique constraint settles races.
        if self.store.exists_by_normalized_email(&email).await? {
            log::debug!("Registration rejected: email already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let refresh = self.new_refresh_session();

        let account = self
            .store
            .create(NewAccount {
                email,
                password_hash,
                first_name,
                last_name,
                phone,
                session: Some(refresh.clone()),
            })
            .await
            .map_err(|err| match err {
                StoreError::DuplicateEmail => {
                    log::debug!("Registration rejected by unique email constraint");
                    AuthError::Conflict
                }
                other => AuthError::Store(other),
            })?;

        log::info!("Account {} registered", account.id);

        self.build_session(&account, refresh)
    }

    /// Authenticate with email and password
    ///
    /// Replaces any session the account already had.
    ///
    /// # Errors
    ///
    /// * `AuthError::Validation` - Malformed email or empty password
    /// * `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// * `AuthError::AccountDeactivated` - Account is inactive, or was deactivated
    ///   while the login was in flight
    pub async fn login(&self, request: LoginRequest) -> AuthResult<Session> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        let Some(mut account) = self.store.find_by_normalized_email(&email).await? else {
            log::debug!("Login rejected: unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !account.is_active {
            log::warn!("Login rejected: account {} is deactivated", account.id);
            return Err(AuthError::AccountDeactivated);
        }

        if !self.hasher.verify(&request.password, &account.password_hash) {
            log::warn!("Login rejected: wrong password for account {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        let refresh = self.new_refresh_session();
        account.session = Some(refresh.clone());
        let session = self.build_session(&account, refresh)?;

        if !self.store.update(&account, UpdateCondition::AccountActive).await? {
            log::warn!("Login rejected: account {} was deactivated concurrently", account.id);
            return Err(AuthError::AccountDeactivated);
        }

        log::info!("Account {} logged in", account.id);

        Ok(session)
    }

    /// Exchange an access token (expired or not) and the current refresh token
    /// for a brand-new pair.
    ///
    /// The presented refresh token is consumed: a second exchange with it fails.
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Access token not issued by us, or its account is gone
    /// * `AuthError::InvalidOrExpiredRefreshToken` - Refresh token stale, expired, or
    ///   rotated by a concurrent refresh
    /// * `AuthError::AccountDeactivated` - Account became inactive while holding a session
    pub async fn refresh(&self, request: RefreshRequest) -> AuthResult<Session> {
        let claims = self.signer.decode_ignoring_expiry(&request.access_token)?;
        let account_id = claims.account_id().ok_or(AuthError::InvalidToken)?;

        let Some(mut account) = self.store.find_by_id(account_id).await? else {
            log::warn!("Refresh rejected: account {account_id} no longer exists");
            return Err(AuthError::InvalidToken);
        };

        let accepted = account
            .session
            .as_ref()
            .is_some_and(|s| s.accepts(&request.refresh_token, Utc::now()));
        if !accepted {
            log::warn!("Refresh rejected: stale or expired refresh token for account {account_id}");
            return Err(AuthError::InvalidOrExpiredRefreshToken);
        }

        if !account.is_active {
            log::warn!("Refresh rejected: account {account_id} is deactivated");
            return Err(AuthError::AccountDeactivated);
        }

        let refresh = self.new_refresh_session();
        account.session = Some(refresh.clone());
        let session = self.build_session(&account, refresh)?;

        let rotated = self
            .store
            .update(
                &account,
                UpdateCondition::RefreshSecretEquals(request.refresh_token),
            )
            .await?;
        if !rotated {
            log::warn!("Refresh rejected: concurrent rotation won for account {account_id}");
            return Err(AuthError::InvalidOrExpiredRefreshToken);
        }

        log::info!("Account {account_id} refreshed its session");

        Ok(session)
    }

    /// Close the account's session.
    ///
    /// Only the session is written, so a concurrent deactivation is never undone.
    /// Idempotent: unknown accounts and accounts without a session are a no-op.
    /// Access tokens already issued stay valid until they expire.
    pub async fn logout(&self, account_id: AccountId) -> AuthResult<()> {
        let Some(mut account) = self.store.find_by_id(account_id).await? else {
            return Ok(());
        };

        if account.session.take().is_none() {
            return Ok(());
        }

        self.store.update(&account, UpdateCondition::Always).await?;

        log::info!("Account {account_id} logged out");

        Ok(())
    }

    /// Fully validate an access token and return the account it was issued to.
    ///
    /// This is how a boundary layer extracts the caller's identity before
    /// forwarding it explicitly, e.g. to [`SessionService::logout`].
    pub fn authenticate(&self, access_token: &str) -> AuthResult<AccountId> {
        self.signer
            .verify_access_token(access_token)?
            .account_id()
            .ok_or(AuthError::InvalidToken)
    }

    /// Deactivate an account and close its session in one write
    ///
    /// # Errors
    ///
    /// * `AuthError::AccountNotFound` - No account with this id
    pub async fn deactivate(&self, account_id: AccountId) -> AuthResult<()> {
        if !self.store.deactivate(account_id).await? {
            return Err(AuthError::AccountNotFound);
        }

        log::info!("Account {account_id} deactivated");

        Ok(())
    }

    fn new_refresh_session(&self) -> RefreshSession {
        RefreshSession {
            secret: self.signer.issue_refresh_secret(),
            expires_at: Utc::now() + self.refresh_token_duration,
        }
    }

    fn build_session(&self, account: &Account, refresh: RefreshSession) -> AuthResult<Session> {
        Ok(Session {
            access_token: self.signer.issue_access_token(account)?,
            refresh_token: refresh.secret,
            expires_at: refresh.expires_at,
            account: account.summary(),
        })
    }
}

/// Validate an already-normalized email
fn validate_email(email: &str) -> AuthResult<()> {
    if email.is_empty() {
        return Err(AuthError::Validation("Email is required".to_string()));
    }

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AuthError::Validation(format!(
            "Email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(AuthError::Validation(
            "A valid email address is required".to_string(),
        )),
    }
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(())
}

/// Trim a name and check its length
fn validate_name(field: &str, value: &str) -> AuthResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }

    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AuthError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// Trim a phone number; blank becomes `None`
fn normalize_phone(phone: Option<&str>) -> AuthResult<Option<String>> {
    let Some(trimmed) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    if trimmed.chars().count() > MAX_PHONE_LEN {
        return Err(AuthError::Validation(format!(
            "Phone must be at most {MAX_PHONE_LEN} characters"
        )));
    }

    Ok(Some(trimmed.to_string()))
}
