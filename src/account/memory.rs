//! In-memory credential store used by the state-machine tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::account::models::{Account, AccountPatch, Challenge, ChallengePurpose, NewAccount};
use crate::account::store::{CredentialStore, StoreError};

#[derive(Default)]
pub(crate) struct MemoryCredentialStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryCredentialStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.lock().expect("store lock poisoned").len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("store lock poisoned");
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("store lock poisoned");
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.lock().expect("store lock poisoned");
        Ok(accounts.values().find(|a| a.phone == phone).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock().expect("store lock poisoned");
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let record = Account {
            id: Uuid::new_v4(),
            name: account.name,
            phone: account.phone,
            email: account.email,
            password_hash: account.password_hash,
            is_admin: account.is_admin,
            is_verified: account.is_verified,
            images: account.images,
            challenge: account.challenge,
        };
        accounts.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        let mut accounts = self.accounts.lock().expect("store lock poisoned");
        let Some(record) = accounts.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(phone) = patch.phone {
            record.phone = phone;
        }
        if let Some(password_hash) = patch.password_hash {
            record.password_hash = password_hash;
        }
        if let Some(is_verified) = patch.is_verified {
            record.is_verified = is_verified;
        }
        if let Some(images) = patch.images {
            record.images = images;
        }
        if let Some(challenge) = patch.challenge {
            record.challenge = challenge;
        }
        Ok(Some(record.clone()))
    }

    async fn issue_verification_challenge(
        &self,
        id: Uuid,
        challenge: &Challenge,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().expect("store lock poisoned");
        let Some(record) = accounts.get_mut(&id) else {
            return Ok(false);
        };
        if record.is_verified {
            return Ok(false);
        }
        record.challenge = Some(challenge.clone());
        Ok(true)
    }

    async fn complete_verification(&self, id: Uuid, code: &str) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().expect("store lock poisoned");
        let Some(record) = accounts.get_mut(&id) else {
            return Ok(false);
        };
        let matches = record.challenge.as_ref().is_some_and(|challenge| {
            challenge.purpose == ChallengePurpose::VerifyEmail
                && challenge.code == code
                && challenge.expires_at > Utc::now()
        });
        if !matches {
            return Ok(false);
        }
        record.is_verified = true;
        record.challenge = None;
        Ok(true)
    }

    async fn complete_recovery(
        &self,
        id: Uuid,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.lock().expect("store lock poisoned");
        let Some(record) = accounts.get_mut(&id) else {
            return Ok(false);
        };
        let matches = record.challenge.as_ref().is_some_and(|challenge| {
            challenge.purpose == ChallengePurpose::Recovery
                && challenge.code == code
                && challenge.expires_at > Utc::now()
        });
        if !matches {
            return Ok(false);
        }
        record.password_hash = password_hash.to_string();
        record.challenge = None;
        Ok(true)
    }
}
