//! The account state machine: registration, verification, sign-in,
//! federated linking, password change, and credential recovery.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::account::error::AccountError;
use crate::account::models::{
    Account, AccountPatch, Challenge, ChallengePurpose, NewAccount,
};
use crate::account::otp::{OtpIssuer, OtpValidation};
use crate::account::password;
use crate::account::store::{CredentialStore, StoreError};
use crate::account::token::TokenIssuer;
use crate::mail::{MailMessage, MailSender};

/// Registration input, exactly what `POST /signup` collects.
#[derive(Clone, Debug)]
pub struct Registration {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

/// Profile fields asserted by the federated identity provider.
#[derive(Clone, Debug)]
pub struct FederatedProfile {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub images: Vec<String>,
}

/// Orchestrates the credential store, hasher, OTP issuer, token issuer, and
/// mail dispatcher. Stateless between calls; all state lives in the store.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    otp: OtpIssuer,
    tokens: TokenIssuer,
    mail: Arc<dyn MailSender>,
}

impl AccountService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        otp: OtpIssuer,
        tokens: TokenIssuer,
        mail: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            store,
            otp,
            tokens,
            mail,
        }
    }

    /// Register a new account, or re-register an existing one by email.
    ///
    /// Re-registration rehashes the password and replaces the challenge; the
    /// account drops back to unverified until the new code is confirmed.
    /// `Conflict` only when the email belongs to one account and the phone to
    /// a different one. The returned token asserts identity, not
    /// verification.
    pub async fn sign_up(
        &self,
        registration: Registration,
    ) -> Result<(Account, String), AccountError> {
        let by_email = self.store.find_by_email(&registration.email).await?;

        if let Some(existing) = &by_email {
            let by_phone = self.store.find_by_phone(&registration.phone).await?;
            if by_phone.as_ref().is_some_and(|other| other.id != existing.id) {
                return Err(AccountError::Conflict);
            }
        }

        let password_hash = password::hash(&registration.password)?;
        let challenge = self.otp.generate(ChallengePurpose::VerifyEmail);

        let account = match by_email {
            Some(existing) => {
                debug!(account_id = %existing.id, "re-registration, replacing challenge");
                let patch = AccountPatch {
                    name: Some(registration.name),
                    phone: Some(registration.phone),
                    password_hash: Some(password_hash),
                    is_verified: Some(false),
                    challenge: Some(Some(challenge.clone())),
                    ..AccountPatch::default()
                };
                self.store
                    .update(existing.id, patch)
                    .await?
                    .ok_or(AccountError::NotFound)?
            }
            None => {
                self.store
                    .create(NewAccount {
                        name: registration.name,
                        phone: registration.phone,
                        email: registration.email,
                        password_hash,
                        is_admin: false,
                        is_verified: false,
                        images: Vec::new(),
                        challenge: Some(challenge.clone()),
                    })
                    .await?
            }
        };

        self.dispatch_challenge(&account.email, &challenge);
        let token = self.tokens.issue(&account)?;
        Ok((account, token))
    }

    /// Replace the verification challenge and redispatch the code.
    ///
    /// Responds uniformly whether or not the account exists. The write is
    /// conditional on the account still being unverified, so a verification
    /// completing between the lookup and the write leaves the verified
    /// account without a challenge and no mail goes out.
    pub async fn resend_otp(&self, email: &str) -> Result<(), AccountError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            return Ok(());
        };

        let challenge = self.otp.generate(ChallengePurpose::VerifyEmail);
        if self
            .store
            .issue_verification_challenge(account.id, &challenge)
            .await?
        {
            self.dispatch_challenge(&account.email, &challenge);
        }
        Ok(())
    }

    /// Confirm the email verification code for the account with this email.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<Account, AccountError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;
        self.confirm_verification(account, code).await
    }

    /// Confirm the email verification code for the account with this id,
    /// cross-checked against the email the caller claims.
    pub async fn verify_email_by_id(
        &self,
        id: Uuid,
        email: &str,
        code: &str,
    ) -> Result<Account, AccountError> {
        let account = self
            .store
            .find_by_id(id)
            .await?
            .filter(|account| account.email == email)
            .ok_or(AccountError::NotFound)?;
        self.confirm_verification(account, code).await
    }

    async fn confirm_verification(
        &self,
        account: Account,
        code: &str,
    ) -> Result<Account, AccountError> {
        let challenge = account
            .challenge
            .as_ref()
            .filter(|challenge| challenge.purpose == ChallengePurpose::VerifyEmail)
            .ok_or(AccountError::NoChallenge)?;

        match OtpIssuer::validate(code, challenge, Utc::now()) {
            OtpValidation::Expired => Err(AccountError::Expired),
            OtpValidation::Invalid => Err(AccountError::InvalidCode),
            OtpValidation::Valid => {
                // Conditional consume; a concurrent resend or verification
                // makes this a no-op and the caller must retry with the
                // current challenge.
                if self.store.complete_verification(account.id, code).await? {
                    self.store
                        .find_by_id(account.id)
                        .await?
                        .ok_or(AccountError::NotFound)
                } else {
                    Err(AccountError::NoChallenge)
                }
            }
        }
    }

    /// Authenticate with email and password.
    ///
    /// Unverified accounts are rejected before any password work so the
    /// verification gate cannot be probed through timing.
    pub async fn sign_in(
        &self,
        email: &str,
        submitted_password: &str,
    ) -> Result<(Account, String), AccountError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !account.is_verified {
            return Err(AccountError::VerificationRequired);
        }

        if !password::verify(submitted_password, &account.password_hash) {
            return Err(AccountError::InvalidCredential);
        }

        let token = self.tokens.issue(&account)?;
        Ok((account, token))
    }

    /// Sign in (or first-time link) via a federated identity provider.
    ///
    /// The provider attests email ownership, so a first sign-in creates the
    /// account already verified, with the locked sentinel in place of a
    /// password hash. An existing account is reused unchanged.
    pub async fn authenticate_federated(
        &self,
        profile: FederatedProfile,
    ) -> Result<(Account, String), AccountError> {
        let account = match self.store.find_by_email(&profile.email).await? {
            Some(existing) => existing,
            None => {
                let created = self
                    .store
                    .create(NewAccount {
                        name: profile.name,
                        phone: profile.phone,
                        email: profile.email.clone(),
                        password_hash: password::sentinel(),
                        is_admin: false,
                        is_verified: true,
                        images: profile.images,
                        challenge: None,
                    })
                    .await;
                match created {
                    Ok(account) => account,
                    // Lost a creation race; the other writer's record wins.
                    Err(StoreError::DuplicateEmail) => self
                        .store
                        .find_by_email(&profile.email)
                        .await?
                        .ok_or(AccountError::NotFound)?,
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let token = self.tokens.issue(&account)?;
        Ok((account, token))
    }

    /// Authenticated password change; touches nothing but the hash.
    pub async fn change_password(
        &self,
        id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let account = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(AccountError::NotFound)?;

        if !password::verify(current_password, &account.password_hash) {
            return Err(AccountError::InvalidCredential);
        }

        let password_hash = password::hash(new_password)?;
        let patch = AccountPatch {
            password_hash: Some(password_hash),
            ..AccountPatch::default()
        };
        self.store
            .update(id, patch)
            .await?
            .ok_or(AccountError::NotFound)?;
        Ok(())
    }

    /// Start unauthenticated credential recovery.
    ///
    /// Responds uniformly whether or not the account exists.
    pub async fn request_password_recovery(&self, email: &str) -> Result<(), AccountError> {
        let Some(account) = self.store.find_by_email(email).await? else {
            return Ok(());
        };

        let challenge = self.otp.generate(ChallengePurpose::Recovery);
        let patch = AccountPatch {
            challenge: Some(Some(challenge.clone())),
            ..AccountPatch::default()
        };
        if self.store.update(account.id, patch).await?.is_some() {
            self.dispatch_challenge(&account.email, &challenge);
        }
        Ok(())
    }

    /// Finish recovery: the outstanding `Recovery` challenge must validate
    /// before the password is replaced; otherwise the stored hash is left
    /// untouched.
    pub async fn complete_password_recovery(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), AccountError> {
        let account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AccountError::NotFound)?;

        let challenge = account
            .challenge
            .as_ref()
            .filter(|challenge| challenge.purpose == ChallengePurpose::Recovery)
            .ok_or(AccountError::NoChallenge)?;

        match OtpIssuer::validate(code, challenge, Utc::now()) {
            OtpValidation::Expired => Err(AccountError::Expired),
            OtpValidation::Invalid => Err(AccountError::InvalidCode),
            OtpValidation::Valid => {
                let password_hash = password::hash(new_password)?;
                if self
                    .store
                    .complete_recovery(account.id, code, &password_hash)
                    .await?
                {
                    Ok(())
                } else {
                    Err(AccountError::NoChallenge)
                }
            }
        }
    }

    /// Hand the code to the mail dispatcher off the critical path.
    ///
    /// The code travels only through mail, never through an API response.
    fn dispatch_challenge(&self, to: &str, challenge: &Challenge) {
        let subject = match challenge.purpose {
            ChallengePurpose::VerifyEmail => "Verify Email",
            ChallengePurpose::Recovery => "Password Recovery",
        };
        let message = MailMessage {
            to: to.to_string(),
            subject: subject.to_string(),
            text: format!("Your OTP is {}", challenge.code),
            html: format!("<p>Your OTP is <strong>{}</strong></p>", challenge.code),
        };
        let mail = Arc::clone(&self.mail);
        tokio::spawn(async move {
            if let Err(err) = mail.send(&message).await {
                error!("Failed to dispatch OTP mail: {err:#}");
            }
        });
    }
}
