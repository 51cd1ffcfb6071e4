//! Request/response types for the account endpoints.
//!
//! Field names keep the wire contract the storefront already speaks
//! (`camelCase`, `newPass` for replacement passwords). Unknown fields are
//! ignored on input, so clients that still send `password` or `isAdmin` to
//! the federated endpoint get them dropped rather than honored.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::account::Account;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendOtpRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct GoogleAuthRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub password: String,
    pub new_pass: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecoverPasswordRequest {
    pub email: String,
    pub otp: String,
    pub new_pass: String,
}

/// Public view of an account. Never carries the password hash or any
/// outstanding OTP.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AccountBody {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub images: Vec<String>,
}

impl From<&Account> for AccountBody {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            phone: account.phone.clone(),
            email: account.email.clone(),
            is_admin: account.is_admin,
            is_verified: account.is_verified,
            images: account.images.clone(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: AccountBody,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};
    use chrono::Utc;

    use crate::account::models::{Challenge, ChallengePurpose};

    #[test]
    fn account_body_drops_secrets() -> Result<()> {
        let account = Account {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            phone: "5550100".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            is_admin: false,
            is_verified: false,
            images: Vec::new(),
            challenge: Some(Challenge {
                purpose: ChallengePurpose::VerifyEmail,
                code: "123456".to_string(),
                expires_at: Utc::now(),
            }),
        };
        let value = serde_json::to_value(AccountBody::from(&account))?;
        let rendered = value.to_string();
        assert!(!rendered.contains("argon2"));
        assert!(!rendered.contains("123456"));
        assert!(value.get("isVerified").is_some());
        assert!(value.get("isAdmin").is_some());
        Ok(())
    }

    #[test]
    fn change_password_uses_the_storefront_field_names() -> Result<()> {
        let request: ChangePasswordRequest = serde_json::from_str(
            r#"{"password": "old", "newPass": "new"}"#,
        )?;
        assert_eq!(request.password, "old");
        assert_eq!(request.new_pass, "new");
        Ok(())
    }

    #[test]
    fn google_auth_ignores_client_supplied_credentials() -> Result<()> {
        let request: GoogleAuthRequest = serde_json::from_str(
            r#"{
                "name": "Alice",
                "phone": "5550100",
                "email": "alice@example.com",
                "password": "attacker-chosen",
                "isAdmin": true
            }"#,
        )?;
        assert_eq!(request.email, "alice@example.com");
        assert!(request.images.is_empty());
        let value = serde_json::to_value(&request)?;
        assert!(value.get("password").is_none());
        assert!(value.get("isAdmin").is_none());
        Ok(())
    }

    #[test]
    fn recover_password_round_trips() -> Result<()> {
        let request = RecoverPasswordRequest {
            email: "alice@example.com".to_string(),
            otp: "123456".to_string(),
            new_pass: "correct-horse".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let otp = value
            .get("otp")
            .and_then(serde_json::Value::as_str)
            .context("missing otp")?;
        assert_eq!(otp, "123456");
        assert!(value.get("newPass").is_some());
        Ok(())
    }
}
