//! Password sign-in endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::account::AccountService;
use crate::api::handlers::{bad_request, error_response, normalize_email};

use super::types::{AuthResponse, SigninRequest};

/// Authenticate with email and password; only verified accounts get in.
#[utoipa::path(
    post,
    path = "/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 400, description = "Invalid credentials or unverified account", body = crate::api::handlers::ErrorBody),
        (status = 404, description = "Account not found", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn signin(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<SigninRequest>>,
) -> impl IntoResponse {
    let request: SigninRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return bad_request("Missing email or password");
    }

    match service.sign_in(&email, &request.password).await {
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
    async fn signin_missing_payload() {
        let response = signin(service(), None).await.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signin_blank_password() {
        let response = signin(
            service(),
            Some(Json(SigninRequest {
                email: "alice@example.com".to_string(),
                password: String::new(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signin_unknown_account_is_404() {
        let response = signin(
            service(),
            Some(Json(SigninRequest {
                email: "nobody@example.com".to_string(),
                password: "hunter2hunter2".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
