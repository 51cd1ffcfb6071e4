//! One-time passcode generation and validation.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, rngs::OsRng};

use crate::account::models::{Challenge, ChallengePurpose};

/// Outcome of checking a submitted code against an outstanding challenge.
///
/// Expiry wins over code comparison: an expired challenge is `Expired` even
/// when the submitted code matches. The absent-challenge case is handled by
/// the service, which never gets this far without one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpValidation {
    Valid,
    Invalid,
    Expired,
}

/// Issues and validates 6-digit numeric challenges.
#[derive(Clone, Copy, Debug)]
pub struct OtpIssuer {
    ttl: Duration,
}

impl OtpIssuer {
    /// Standard challenge lifetime: every challenge expires ten minutes
    /// after issuance. `--otp-ttl-minutes` overrides this per deployment
    /// as a deliberate operational knob; a challenge always carries the
    /// expiry it was issued with, so validation is unaffected by later
    /// TTL changes.
    pub const DEFAULT_TTL_MINUTES: i64 = 10;

    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: Duration::minutes(Self::DEFAULT_TTL_MINUTES),
        }
    }

    #[must_use]
    pub fn with_ttl_minutes(minutes: i64) -> Self {
        Self {
            ttl: Duration::minutes(minutes),
        }
    }

    /// Produce a fresh challenge expiring `ttl` from now.
    ///
    /// Codes come from the OS random source; `000000` is as likely as any
    /// other code and is valid.
    #[must_use]
    pub fn generate(&self, purpose: ChallengePurpose) -> Challenge {
        let code = format!("{:06}", OsRng.gen_range(0..1_000_000u32));
        Challenge {
            purpose,
            code,
            expires_at: Utc::now() + self.ttl,
        }
    }

    /// Check `submitted` against `challenge` at wall-clock `now`.
    #[must_use]
    pub fn validate(
        submitted: &str,
        challenge: &Challenge,
        now: DateTime<Utc>,
    ) -> OtpValidation {
        // Expiry is checked first so a stale code never reads as Valid.
        if now >= challenge.expires_at {
            return OtpValidation::Expired;
        }
        if submitted == challenge.code {
            OtpValidation::Valid
        } else {
            OtpValidation::Invalid
        }
    }
}

impl Default for OtpIssuer {
    fn default() -> Self {
        Self::new()
    }
}
