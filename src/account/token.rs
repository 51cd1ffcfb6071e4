//! Signed bearer tokens asserting account identity.
//!
//! Tokens are HS256 JWTs carrying `{sub, email, iat, exp}`. The signing
//! secret is fixed at startup and never rotated at runtime. Unlike the
//! `isVerified` flag, a token only asserts identity; callers that need a
//! trusted address must check verification state separately. The `exp`
//! claim is a hardening addition: the back office the flows were ported
//! from issued tokens that never expired.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::models::Account;

/// Claims embedded in every session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues session tokens; a pure computation safe for concurrent callers.
#[derive(Clone)]
pub struct TokenIssuer {
    secret: SecretString,
    ttl_seconds: i64,
}

impl TokenIssuer {
    pub const DEFAULT_TTL_SECONDS: i64 = 86_400;

    #[must_use]
    pub fn new(secret: SecretString, ttl_seconds: i64) -> Self {
        Self {
            secret,
            ttl_seconds,
        }
    }

    /// Sign a token for `account` valid from now until now + TTL.
    pub fn issue(&self, account: &Account) -> Result<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: account.id,
            email: account.email.clone(),
            iat,
            exp: iat + self.ttl_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .context("failed to sign session token")
    }

    #[cfg(test)]
    pub(crate) fn decode(&self, token: &str) -> Result<Claims> {
        use jsonwebtoken::{DecodingKey, Validation, decode};

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &Validation::default(),
        )
        .context("failed to decode session token")?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{models::Account, password};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(SecretString::from("test-secret"), 3600)
    }

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            phone: "5550100".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: password::sentinel(),
            is_admin: false,
            is_verified: true,
            images: Vec::new(),
            challenge: None,
        }
    }

    #[test]
    fn issued_token_carries_identity_claims() -> Result<()> {
        let issuer = issuer();
        let account = account();
        let token = issuer.issue(&account)?;
        let claims = issuer.decode(&token)?;
        assert_eq!(claims.sub, account.id);
        assert_eq!(claims.email, account.email);
        assert_eq!(claims.exp, claims.iat + 3600);
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_fails_decoding() -> Result<()> {
        let account = account();
        let token = TokenIssuer::new(SecretString::from("other"), 3600).issue(&account)?;
        assert!(issuer().decode(&token).is_err());
        Ok(())
    }
}
