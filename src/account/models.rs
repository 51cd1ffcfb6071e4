//! Account records and the OTP challenge embedded in them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What an outstanding challenge is allowed to prove.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChallengePurpose {
    /// Proves ownership of the email given at registration.
    VerifyEmail,
    /// Authorizes an unauthenticated password reset.
    Recovery,
}

impl ChallengePurpose {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::VerifyEmail => "verify_email",
            Self::Recovery => "recovery",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "verify_email" => Some(Self::VerifyEmail),
            "recovery" => Some(Self::Recovery),
            _ => None,
        }
    }
}

/// A short-lived numeric code backing one OTP flow.
///
/// Exists only while the flow is outstanding; cleared on success.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub purpose: ChallengePurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// An account in the credential store.
///
/// `password_hash` is a PHC string for password accounts and the locked
/// sentinel for federated-only accounts; it never leaves the service.
#[derive(Clone, Debug)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub images: Vec<String>,
    pub challenge: Option<Challenge>,
}

/// Fields for creating an account; the store assigns nothing on top of these
/// except the generated id.
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub images: Vec<String>,
    pub challenge: Option<Challenge>,
}

/// Partial update applied atomically to a single account record.
///
/// `challenge` is tri-state: `None` leaves the stored challenge alone,
/// `Some(None)` clears it, `Some(Some(_))` replaces it.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub is_verified: Option<bool>,
    pub images: Option<Vec<String>>,
    pub challenge: Option<Option<Challenge>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_round_trips_through_storage_form() {
        for purpose in [ChallengePurpose::VerifyEmail, ChallengePurpose::Recovery] {
            assert_eq!(ChallengePurpose::parse(purpose.as_str()), Some(purpose));
        }
    }

    #[test]
    fn purpose_rejects_unknown_values() {
        assert_eq!(ChallengePurpose::parse("totp"), None);
        assert_eq!(ChallengePurpose::parse(""), None);
    }

    #[test]
    fn patch_default_touches_nothing() {
        let patch = AccountPatch::default();
        assert!(patch.name.is_none());
        assert!(patch.password_hash.is_none());
        assert!(patch.is_verified.is_none());
        assert!(patch.challenge.is_none());
    }
}
