//! Persistence contract for account records.

use async_trait::async_trait;
use uuid::Uuid;

use crate::account::models::{Account, AccountPatch, Challenge, NewAccount};

/// Storage failures, with unique-email violations split out so callers can
/// map them to a conflict instead of an internal error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Keyed lookups and atomic per-record updates over account records.
///
/// Every method is atomic with respect to a single record. Challenge
/// issuance and consumption are conditional read-modify-writes:
/// `issue_verification_challenge` applies only while the account is still
/// unverified, and the two `complete_*` operations apply only while a
/// matching unexpired challenge is outstanding. That is what serializes
/// races like a resend overtaking an in-flight verification; callers never
/// see a separate read-then-write pair.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new record; `DuplicateEmail` if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Apply `patch` to one record; `None` if the id does not exist.
    async fn update(&self, id: Uuid, patch: AccountPatch)
    -> Result<Option<Account>, StoreError>;

    /// Replace the outstanding challenge, iff the account is still
    /// unverified. Returns whether the update applied; `false` means a
    /// concurrent verification won and the account must keep no challenge.
    async fn issue_verification_challenge(
        &self,
        id: Uuid,
        challenge: &Challenge,
    ) -> Result<bool, StoreError>;

    /// Mark the account verified and clear its challenge, iff an unexpired
    /// `VerifyEmail` challenge with exactly this code is outstanding.
    /// Returns whether the update applied.
    async fn complete_verification(&self, id: Uuid, code: &str) -> Result<bool, StoreError>;

    /// Store `password_hash` and clear the challenge, iff an unexpired
    /// `Recovery` challenge with exactly this code is outstanding.
    /// Returns whether the update applied.
    async fn complete_recovery(
        &self,
        id: Uuid,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;
}
