//! Federated (Google) sign-in endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::account::AccountService;
use crate::account::service::FederatedProfile;
use crate::api::handlers::{bad_request, error_response, normalize_email, valid_email};

use super::types::{AuthResponse, GoogleAuthRequest};

/// Sign in with a provider-attested profile. A first sign-in creates the
/// account already verified and locked for password sign-in; any
/// client-supplied `password` or `isAdmin` field is ignored.
#[utoipa::path(
    post,
    path = "/authWithGoogle",
    request_body = GoogleAuthRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Missing or malformed payload", body = crate::api::handlers::ErrorBody),
        (status = 500, description = "Sign-in failed", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn auth_with_google(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<GoogleAuthRequest>>,
) -> impl IntoResponse {
    let request: GoogleAuthRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return bad_request("Invalid email");
    }

    let profile = FederatedProfile {
        name: request.name.trim().to_string(),
        phone: request.phone.trim().to_string(),
        email,
        images: request.images,
    };

    match service.authenticate_federated(profile).await {
        Ok((account, token)) => (
            StatusCode::OK,
            Json(AuthResponse {
                success: true,
                message: "Authenticated".to_string(),
                token,
                user: (&account).into(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use axum::http::StatusCode;
    use secrecy::SecretString;

    use crate::account::memory::MemoryCredentialStore;
    use crate::account::otp::OtpIssuer;
    use crate::account::token::TokenIssuer;
    use crate::mail::LogMailSender;

    fn service() -> Extension<Arc<AccountService>> {
        Extension(Arc::new(AccountService::new(
            Arc::new(MemoryCredentialStore::new()),
            OtpIssuer::new(),
            TokenIssuer::new(SecretString::from("test-secret"), 3600),
            Arc::new(LogMailSender),
        )))
    }

    #[tokio::test]
    async fn auth_with_google_missing_payload() {
        let response = auth_with_google(service(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn auth_with_google_invalid_email() {
        let response = auth_with_google(
            service(),
            Some(Json(GoogleAuthRequest {
                name: "Alice".to_string(),
                phone: "5550100".to_string(),
                email: "not-an-email".to_string(),
                images: Vec::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn auth_with_google_returns_a_verified_user() -> Result<()> {
        let response = auth_with_google(
            service(),
            Some(Json(GoogleAuthRequest {
                name: "Alice".to_string(),
                phone: "5550100".to_string(),
                email: "alice@example.com".to_string(),
                images: vec!["https://cdn.example.com/alice.png".to_string()],
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(
            value.pointer("/user/isVerified"),
            Some(&serde_json::Value::Bool(true))
        );
        assert_eq!(
            value.pointer("/user/isAdmin"),
            Some(&serde_json::Value::Bool(false))
        );
        Ok(())
    }
}
