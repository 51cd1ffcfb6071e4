//! Account identity domain: models, credential storage, OTP challenges,
//! password hashing, token issuance, and the service that orchestrates them.
//!
//! ## State machine
//!
//! Every account is in one of three states: `Unverified/NoChallenge`,
//! `Unverified/ChallengeIssued`, or `Verified`. Registration and resend move
//! an account into `Unverified/ChallengeIssued`; a successful email
//! verification moves it to `Verified` and clears the challenge. A verified
//! account never has an outstanding challenge except while a password
//! recovery is in flight.
//!
//! ## Challenges
//!
//! A challenge is a `{purpose, code, expires_at}` tuple. Purposes are tagged
//! (`VerifyEmail` vs `Recovery`) so the two flows cannot consume or
//! invalidate each other's codes.

pub mod error;
pub mod models;
pub mod otp;
pub mod password;
pub mod pg;
pub mod service;
pub mod store;
pub mod token;

#[cfg(test)]
pub(crate) mod memory;


pub use error::AccountError;
pub use models::{Account, AccountPatch, Challenge, ChallengePurpose, NewAccount};
pub use service::AccountService;
pub use store::CredentialStore;
