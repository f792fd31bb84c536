//! In-process credential store.
//!
//! Every operation runs under one lock, so the unique-email check and the
//! rotation guard hold the same way the PostgreSQL constraints do.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::repository::{CredentialStore, UpdateCondition};
use crate::auth::{Account, AccountId, NewAccount};

/// `CredentialStore` backed by a `HashMap`
#[derive(Default)]
pub struct MemoryCredentialStore {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload an account, replacing any account with the same id
    pub async fn insert(&self, account: Account) {
        self.accounts.write().await.insert(account.id, account);
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: AccountId) -> StoreResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_normalized_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn exists_by_normalized_email(&self, email: &str) -> StoreResult<bool> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().any(|a| a.email == email))
    }

    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let account = account.into_account(Uuid::new_v4(), Utc::now());
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update(&self, account: &Account, condition: UpdateCondition) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        let Some(stored) = accounts.get_mut(&account.id) else {
            return Ok(false);
        };

        let holds = match &condition {
            UpdateCondition::Always => true,
            UpdateCondition::AccountActive => stored.is_active,
            UpdateCondition::RefreshSecretEquals(expected) => {
                stored.refresh_secret() == Some(expected.as_str())
            }
        };
        if !holds {
            return Ok(false);
        }

        stored.session = account.session.clone();
        stored.updated_at = Utc::now();
        Ok(true)
    }

    async fn deactivate(&self, id: AccountId) -> StoreResult<bool> {
        let mut accounts = self.accounts.write().await;
        let Some(stored) = accounts.get_mut(&id) else {
            return Ok(false);
        };

        stored.is_active = false;
        stored.session = None;
        stored.updated_at = Utc::now();
        Ok(true)
    }
}
