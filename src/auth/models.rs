//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Account ID type
pub type AccountId = Uuid;

/// Trim and lower-case an email so it can be used as a lookup and uniqueness key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The server-side half of an active session.
///
/// The secret and its expiry only ever exist together, so an account either
/// has a complete refresh session or none at all.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub secret: String,
    pub expires_at: DateTime<Utc>,
}

impl RefreshSession {
    /// Constant-time comparison of a presented secret against the stored one.
    pub fn matches(&self, presented: &str) -> bool {
        self.secret.as_bytes().ct_eq(presented.as_bytes()).into()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// True when `presented` equals the stored secret and the session has not expired.
    pub fn accepts(&self, presented: &str, now: DateTime<Utc>) -> bool {
        self.matches(presented) && !self.is_expired_at(now)
    }
}

impl std::fmt::Debug for RefreshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshSession")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Account model
#[derive(Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub session: Option<RefreshSession>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Public view of the account embedded in session responses
    pub fn summary(&self) -> AccountSummary {
        AccountSummary {
            id: self.id,
            email: self.email.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    /// Secret of the stored refresh session, if any
    pub fn refresh_secret(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.secret.as_str())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .field("avatar_url", &self.avatar_url)
            .field("is_active", &self.is_active)
            .field("session", &self.session)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Account fields supplied by registration; the store assigns id and timestamps.
#[derive(Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub session: Option<RefreshSession>,
}

impl NewAccount {
    /// Materialize the record with a store-assigned id.
    pub fn into_account(self, id: AccountId, now: DateTime<Utc>) -> Account {
        Account {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            avatar_url: None,
            is_active: true,
            session: self.session,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Basic account info embedded in session responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: AccountId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
}

/// Account registration request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Account login request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Token refresh request
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issued session: token pair plus the account it belongs to
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry of `refresh_token`
    pub expires_at: DateTime<Utc>,
    pub account: AccountSummary,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("account", &self.account)
            .finish()
    }
}

/// JWT claims for access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,           // Account ID
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub jti: String,           // Unique token ID
    pub iat: i64,              // Issued at timestamp
    pub nbf: i64,              // Not before timestamp
    pub exp: i64,              // Expiration timestamp
    pub iss: String,
    pub aud: String,
}

impl AccessTokenClaims {
    /// Subject parsed as an account id
    pub fn account_id(&self) -> Option<AccountId> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(secret: &str, expires_in: Duration) -> RefreshSession {
        RefreshSession {
            secret: secret.to_string(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@B.com "), "a@b.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
        assert_eq!(normalize_email("\tUser.Name@Example.ORG\n"), "user.name@example.org");
    }

    #[test]
    fn test_refresh_session_accepts_matching_unexpired_secret() {
        let s = session("secret-value", Duration::days(1));
        assert!(s.accepts("secret-value", Utc::now()));
    }

    #[test]
    fn test_refresh_session_rejects_mismatch() {
        let s = session("secret-value", Duration::days(1));
        assert!(!s.accepts("secret-valuf", Utc::now()));
        assert!(!s.accepts("secret", Utc::now()));
        assert!(!s.accepts("", Utc::now()));
    }

    #[test]
    fn test_refresh_session_rejects_expired_even_when_matching() {
        let s = session("secret-value", Duration::seconds(-1));
        assert!(s.matches("secret-value"));
        assert!(!s.accepts("secret-value", Utc::now()));
    }

    #[test]
    fn test_debug_output_redacts_secrets() {
        let now = Utc::now();
        let account = NewAccount {
            email: "a@b.com".to_string(),
            password_hash: "$argon2id$v=19$hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: None,
            session: Some(session("refresh-secret", Duration::days(7))),
        }
        .into_account(Uuid::new_v4(), now);

        let rendered = format!("{account:?}");
        assert!(!rendered.contains("argon2id"));
        assert!(!rendered.contains("refresh-secret"));
        assert!(rendered.contains("a@b.com"));
    }

    #[test]
    fn test_new_account_starts_active() {
        let id = Uuid::new_v4();
        let account = NewAccount {
            email: "a@b.com".to_string(),
            password_hash: "hash".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone: Some("555-0100".to_string()),
            session: None,
        }
        .into_account(id, Utc::now());

        assert_eq!(account.id, id);
        assert!(account.is_active);
        assert!(account.avatar_url.is_none());
        assert!(account.refresh_secret().is_none());
        assert_eq!(account.summary().email, "a@b.com");
    }

    #[test]
    fn test_claims_account_id() {
        let id = Uuid::new_v4();
        let mut claims = AccessTokenClaims {
            sub: id.to_string(),
            email: "a@b.com".to_string(),
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: 0,
            nbf: 0,
            exp: 0,
            iss: "iss".to_string(),
            aud: "aud".to_string(),
        };
        assert_eq!(claims.account_id(), Some(id));

        claims.sub = "not-a-uuid".to_string();
        assert_eq!(claims.account_id(), None);
    }

    #[test]
    fn test_register_request_phone_optional() {
        let request: RegisterRequest = serde_json::from_str(
            r#"{"email":"a@b.com","password":"pw","firstName":"Ada","lastName":"Lovelace"}"#,
        )
        .unwrap();
        assert!(request.phone.is_none());
        assert!(!format!("{request:?}").contains("\"pw\""));
    }
}
