//! Postgres-backed credential store.
//!
//! Expected schema:
//!
//! ```sql
//! CREATE TABLE accounts (
//!     id              UUID PRIMARY KEY,
//!     name            TEXT NOT NULL,
//!     phone           TEXT NOT NULL,
//!     email           TEXT NOT NULL UNIQUE,
//!     password        TEXT NOT NULL,
//!     is_admin        BOOLEAN NOT NULL DEFAULT FALSE,
//!     is_verified     BOOLEAN NOT NULL DEFAULT FALSE,
//!     images          TEXT[] NOT NULL DEFAULT '{}',
//!     otp_code        TEXT,
//!     otp_purpose     TEXT,
//!     otp_expires_at  TIMESTAMPTZ
//! );
//! ```
//!
//! All writes are single statements so concurrent operations on the same
//! record serialize inside Postgres; challenge consumption re-checks the
//! code, purpose, and expiry in the `WHERE` clause.

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use crate::account::models::{Account, AccountPatch, Challenge, ChallengePurpose, NewAccount};
use crate::account::store::{CredentialStore, StoreError};

const ACCOUNT_COLUMNS: &str = "id, name, phone, email, password, is_admin, is_verified, images, \
     otp_code, otp_purpose, otp_expires_at";

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let otp_code: Option<String> = row.try_get("otp_code").context("otp_code")?;
    let otp_purpose: Option<String> = row.try_get("otp_purpose").context("otp_purpose")?;
    let otp_expires_at: Option<DateTime<Utc>> =
        row.try_get("otp_expires_at").context("otp_expires_at")?;

    let challenge = match (otp_code, otp_purpose, otp_expires_at) {
        (Some(code), Some(purpose), Some(expires_at)) => {
            let purpose = ChallengePurpose::parse(&purpose)
                .ok_or_else(|| anyhow!("unknown challenge purpose in store: {purpose}"))?;
            Some(Challenge {
                purpose,
                code,
                expires_at,
            })
        }
        (None, None, None) => None,
        _ => return Err(anyhow!("partial challenge columns for account record").into()),
    };

    Ok(Account {
        id: row.try_get("id").context("id")?,
        name: row.try_get("name").context("name")?,
        phone: row.try_get("phone").context("phone")?,
        email: row.try_get("email").context("email")?,
        password_hash: row.try_get("password").context("password")?,
        is_admin: row.try_get("is_admin").context("is_admin")?,
        is_verified: row.try_get("is_verified").context("is_verified")?,
        images: row.try_get("images").context("images")?,
        challenge,
    })
}

impl PgCredentialStore {
    async fn find_by_column(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = $1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .with_context(|| format!("failed to look up account by {column}"))?;

        row.as_ref().map(account_from_row).transpose()
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.find_by_column("email", email).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by id")?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Account>, StoreError> {
        self.find_by_column("phone", phone).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            r"
            INSERT INTO accounts
                (id, name, phone, email, password, is_admin, is_verified, images,
                 otp_code, otp_purpose, otp_expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ACCOUNT_COLUMNS}
            "
        );
        let (otp_code, otp_purpose, otp_expires_at) = challenge_columns(account.challenge.as_ref());
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&account.name)
            .bind(&account.phone)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.is_admin)
            .bind(account.is_verified)
            .bind(&account.images)
            .bind(otp_code)
            .bind(otp_purpose)
            .bind(otp_expires_at)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Other(anyhow::Error::new(err).context("failed to insert account"))
                }
            })?;

        account_from_row(&row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AccountPatch,
    ) -> Result<Option<Account>, StoreError> {
        // One statement so the patch is atomic per record; $7 selects whether
        // the challenge columns are rewritten (set or cleared) or untouched.
        let query = format!(
            r"
            UPDATE accounts SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                password = COALESCE($4, password),
                is_verified = COALESCE($5, is_verified),
                images = COALESCE($6, images),
                otp_code = CASE WHEN $7 THEN $8 ELSE otp_code END,
                otp_purpose = CASE WHEN $7 THEN $9 ELSE otp_purpose END,
                otp_expires_at = CASE WHEN $7 THEN $10 ELSE otp_expires_at END
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "
        );
        let touch_challenge = patch.challenge.is_some();
        let challenge = patch.challenge.as_ref().and_then(Option::as_ref);
        let (otp_code, otp_purpose, otp_expires_at) = challenge_columns(challenge);
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&patch.name)
            .bind(&patch.phone)
            .bind(&patch.password_hash)
            .bind(patch.is_verified)
            .bind(&patch.images)
            .bind(touch_challenge)
            .bind(otp_code)
            .bind(otp_purpose)
            .bind(otp_expires_at)
            .fetch_optional(&self.pool)
            .instrument(query_span("UPDATE", &query))
            .await
            .context("failed to update account")?;

        row.as_ref().map(account_from_row).transpose()
    }

    async fn issue_verification_challenge(
        &self,
        id: Uuid,
        challenge: &Challenge,
    ) -> Result<bool, StoreError> {
        // The verified check lives in the same statement, so a verification
        // landing first makes this a no-op instead of stranding a challenge
        // on a verified account.
        let query = r"
            UPDATE accounts SET
                otp_code = $2,
                otp_purpose = 'verify_email',
                otp_expires_at = $3
            WHERE id = $1
              AND NOT is_verified
            ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(&challenge.code)
            .bind(challenge.expires_at)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to issue verification challenge")?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_verification(&self, id: Uuid, code: &str) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts SET
                is_verified = TRUE,
                otp_code = NULL,
                otp_purpose = NULL,
                otp_expires_at = NULL
            WHERE id = $1
              AND otp_purpose = 'verify_email'
              AND otp_code = $2
              AND otp_expires_at > NOW()
            ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(code)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to complete email verification")?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_recovery(
        &self,
        id: Uuid,
        code: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts SET
                password = $3,
                otp_code = NULL,
                otp_purpose = NULL,
                otp_expires_at = NULL
            WHERE id = $1
              AND otp_purpose = 'recovery'
              AND otp_code = $2
              AND otp_expires_at > NOW()
            ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(code)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to complete password recovery")?;

        Ok(result.rows_affected() == 1)
    }
}

type ChallengeColumns = (
    Option<String>,
    Option<&'static str>,
    Option<DateTime<Utc>>,
);

fn challenge_columns(challenge: Option<&Challenge>) -> ChallengeColumns {
    match challenge {
        Some(challenge) => (
            Some(challenge.code.clone()),
            Some(challenge.purpose.as_str()),
            Some(challenge.expires_at),
        ),
        None => (None, None, None),
    }
}
