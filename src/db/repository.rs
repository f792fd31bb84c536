//! Credential store trait and its PostgreSQL implementation.
//!
//! The session service only talks to [`CredentialStore`], which keeps it
//! testable against the in-memory store and independent of the database.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

use super::errors::{StoreError, StoreResult};
use super::timeouts::{DEFAULT_QUERY_TIMEOUT, with_timeout};
use crate::auth::{Account, AccountId, NewAccount, RefreshSession};

/// Guard applied to [`CredentialStore::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateCondition {
    /// Write unconditionally (logout)
    Always,
    /// Write only while the account is still active (login)
    AccountActive,
    /// Write only if the stored refresh secret still equals this value (refresh rotation)
    RefreshSecretEquals(String),
}

/// Trait for account credential storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>>;

    /// Find account by an already-normalized email
    async fn find_by_normalized_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Check whether an already-normalized email is registered
    async fn exists_by_normalized_email(&self, email: &str) -> StoreResult<bool>;

    /// Insert a new account.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken, even when
    /// two inserts race.
    async fn create(&self, account: NewAccount) -> StoreResult<Account>;

    /// Persist the refresh session of `account`.
    ///
    /// Only the session columns are written; the active flag and profile are
    /// left as stored. Returns `false` when the account does not exist or
    /// `condition` does not hold, and nothing is written in that case.
    async fn update(&self, account: &Account, condition: UpdateCondition) -> StoreResult<bool>;

    /// Mark the account inactive and clear its session in one write.
    ///
    /// Returns `false` when the account does not exist.
    async fn deactivate(&self, id: AccountId) -> StoreResult<bool>;
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, first_name, last_name, phone, avatar_url, \
     is_active, refresh_token, refresh_token_expires_at, created_at, updated_at";

/// Default PostgreSQL implementation of `CredentialStore`
pub struct PgCredentialStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    /// Override the per-query timeout
    pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
        self.query_timeout = query_timeout;
        self
    }

    async fn fetch_one_where(&self, predicate: &str, value: Bind<'_>) -> StoreResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {predicate}");
        let query = sqlx::query(&sql);
        let query = match value {
            Bind::Id(id) => query.bind(id),
            Bind::Text(text) => query.bind(text),
        };

        let row = with_timeout(self.query_timeout, async {
            query.fetch_optional(&self.pool).await.map_err(StoreError::from)
        })
        .await?;

        row.as_ref().map(row_to_account).transpose()
    }
}

enum Bind<'a> {
    Id(AccountId),
    Text(&'a str),
}

fn row_to_account(row: &PgRow) -> StoreResult<Account> {
    let secret: Option<String> = row.try_get("refresh_token")?;
    let expires_at: Option<DateTime<Utc>> = row.try_get("refresh_token_expires_at")?;

    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        avatar_url: row.try_get("avatar_url")?,
        is_active: row.try_get("is_active")?,
        session: match (secret, expires_at) {
            (Some(secret), Some(expires_at)) => Some(RefreshSession { secret, expires_at }),
            _ => None,
        },
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        self.fetch_one_where("id = $1", Bind::Id(id)).await
    }

    async fn find_by_normalized_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.fetch_one_where("email = $1", Bind::Text(email)).await
    }

    async fn exists_by_normalized_email(&self, email: &str) -> StoreResult<bool> {
        let row = with_timeout(self.query_timeout, async {
            sqlx::query("SELECT EXISTS(SELECT 1 FROM accounts WHERE email = $1) AS taken")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from)
        })
        .await?;

        Ok(row.try_get("taken")?)
    }

    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let (secret, expires_at) = match &account.session {
            Some(session) => (Some(session.secret.as_str()), Some(session.expires_at)),
            None => (None, None),
        };

        let sql = format!(
            "INSERT INTO accounts (email, password_hash, first_name, last_name, phone, \
                                   refresh_token, refresh_token_expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let row = with_timeout(self.query_timeout, async {
            sqlx::query(&sql)
                .bind(&account.email)
                .bind(&account.password_hash)
                .bind(&account.first_name)
                .bind(&account.last_name)
                .bind(&account.phone)
                .bind(secret)
                .bind(expires_at)
                .fetch_one(&self.pool)
                .await
                .map_err(StoreError::from_insert)
        })
        .await?;

        row_to_account(&row)
    }

    async fn update(&self, account: &Account, condition: UpdateCondition) -> StoreResult<bool> {
        let (secret, expires_at) = match &account.session {
            Some(session) => (Some(session.secret.as_str()), Some(session.expires_at)),
            None => (None, None),
        };

        // The guard and the write are one statement, so two refreshes racing on
        // the same secret cannot both match, and a login cannot reopen a session
        // on an account deactivated after it was read.
        let guard = match condition {
            UpdateCondition::Always => "",
            UpdateCondition::AccountActive => " AND is_active",
            UpdateCondition::RefreshSecretEquals(_) => " AND refresh_token = $4",
        };
        let sql = format!(
            "UPDATE accounts
             SET refresh_token = $2, refresh_token_expires_at = $3, updated_at = NOW()
             WHERE id = $1{guard}"
        );

        let mut query = sqlx::query(&sql)
            .bind(account.id)
            .bind(secret)
            .bind(expires_at);
        if let UpdateCondition::RefreshSecretEquals(expected) = &condition {
            query = query.bind(expected.as_str());
        }

        let result = with_timeout(self.query_timeout, async {
            query.execute(&self.pool).await.map_err(StoreError::from)
        })
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn deactivate(&self, id: AccountId) -> StoreResult<bool> {
        let result = with_timeout(self.query_timeout, async {
            sqlx::query(
                "UPDATE accounts
                 SET is_active = FALSE, refresh_token = NULL, refresh_token_expires_at = NULL,
                     updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)
        })
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
