//! # Emporia Identity (Storefront Account Authority)
//!
//! `emporia` is the account identity service for the Emporia e-commerce
//! back office. It handles registration, OTP email verification, sign-in,
//! federated (Google) authentication, and password management.
//!
//! ## Account Model
//!
//! Accounts are keyed by a unique email. Every account is in one of three
//! states: unverified with no challenge, unverified with an outstanding
//! challenge, or verified. Password sign-in is gated on the verified state;
//! federated accounts are created verified because the provider attests
//! email ownership.
//!
//! ## OTP Challenges
//!
//! Ownership proofs use short-lived 6-digit codes delivered by email, never
//! through API responses. A challenge carries its purpose (`verify_email` or
//! `recovery`), so the two flows cannot consume each other's codes, and is
//! cleared atomically on success so codes never replay.
//!
//! ## Anti-Enumeration
//!
//! Resend and recovery-start answer identically whether or not the account
//! exists. Failures surface a stable machine-readable `error` kind; internal
//! causes stay in the logs.

pub mod account;
pub mod api;
pub mod cli;
pub mod mail;
