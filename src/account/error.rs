//! The error taxonomy user-visible failures are mapped from.

use crate::account::store::StoreError;

/// Failures surfaced by [`crate::account::AccountService`] operations.
///
/// Every variant except `Internal` is safe to show to callers; `Internal`
/// wraps store/mail/hash failures and is logged server-side only.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Account not found")]
    NotFound,
    #[error("An account with this email or phone already exists")]
    Conflict,
    #[error("Invalid credentials")]
    InvalidCredential,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("Verification code has expired")]
    Expired,
    #[error("No verification code is outstanding for this account")]
    NoChallenge,
    #[error("Account is not verified yet")]
    VerificationRequired,
    #[error("Something went wrong")]
    Internal(#[from] anyhow::Error),
}

impl AccountError {
    /// Stable machine-readable kind included in error response bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::InvalidCode => "INVALID_CODE",
            Self::Expired => "EXPIRED",
            Self::NoChallenge => "NO_CHALLENGE",
            Self::VerificationRequired => "VERIFICATION_REQUIRED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Conflict,
            StoreError::Other(err) => Self::Internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(AccountError::NotFound.kind(), "NOT_FOUND");
        assert_eq!(AccountError::Conflict.kind(), "CONFLICT");
        assert_eq!(AccountError::InvalidCredential.kind(), "INVALID_CREDENTIAL");
        assert_eq!(AccountError::InvalidCode.kind(), "INVALID_CODE");
        assert_eq!(AccountError::Expired.kind(), "EXPIRED");
        assert_eq!(AccountError::NoChallenge.kind(), "NO_CHALLENGE");
        assert_eq!(
            AccountError::VerificationRequired.kind(),
            "VERIFICATION_REQUIRED"
        );
        assert_eq!(AccountError::Internal(anyhow!("boom")).kind(), "INTERNAL");
    }

    #[test]
    fn internal_message_hides_the_cause() {
        let err = AccountError::Internal(anyhow!("connection refused (10.0.0.3:5432)"));
        assert_eq!(err.to_string(), "Something went wrong");
    }

    #[test]
    fn duplicate_store_error_maps_to_conflict() {
        let err = AccountError::from(StoreError::DuplicateEmail);
        assert_eq!(err.kind(), "CONFLICT");

        let err = AccountError::from(StoreError::Other(anyhow!("io")));
        assert_eq!(err.kind(), "INTERNAL");
    }
}
