//! Account identity endpoints: registration, OTP verification, sign-in,
//! federated auth, and password management.

pub mod federated;
pub mod password;
pub mod signin;
pub mod signup;
pub mod types;
pub mod verification;
