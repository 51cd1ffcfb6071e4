//! Password change and recovery endpoints.

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::account::AccountService;
use crate::api::handlers::{bad_request, error_response, normalize_email, valid_email};

use super::types::{
    ChangePasswordRequest, ForgotPasswordRequest, RecoverPasswordRequest, StatusResponse,
};

/// Authenticated password change; the current password must verify.
#[utoipa::path(
    put,
    path = "/changePassword/{id}",
    request_body = ChangePasswordRequest,
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Password changed", body = StatusResponse),
        (status = 400, description = "Wrong current password or missing payload", body = crate::api::handlers::ErrorBody),
        (status = 404, description = "Account not found", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn change_password(
    service: Extension<Arc<AccountService>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ChangePasswordRequest>>,
) -> impl IntoResponse {
    let request: ChangePasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    if request.password.is_empty() || request.new_pass.is_empty() {
        return bad_request("Missing current or new password");
    }

    match service
        .change_password(id, &request.password, &request.new_pass)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                success: true,
                message: "Password changed successfully".to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Start password recovery (always returns 200 to avoid user enumeration).
#[utoipa::path(
    post,
    path = "/forgotPassword",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Recovery OTP dispatched if the account exists", body = StatusResponse),
        (status = 400, description = "Missing payload", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn forgot_password(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<ForgotPasswordRequest>>,
) -> impl IntoResponse {
    let request: ForgotPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let accepted = (
        StatusCode::OK,
        Json(StatusResponse {
            success: true,
            message: "OTP sent".to_string(),
        }),
    )
        .into_response();

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        // Invalid addresses answer the same way as unknown ones.
        return accepted;
    }

    if let Err(err) = service.request_password_recovery(&email).await {
        // Keep the response opaque; failures only reach the logs.
        error!("Failed to start password recovery: {err:#}");
    }
    accepted
}

/// Finish password recovery; the recovery OTP must validate before the
/// password is replaced.
#[utoipa::path(
    post,
    path = "/forgotPassword/changePassword",
    request_body = RecoverPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = StatusResponse),
        (status = 400, description = "Invalid, expired, or missing OTP", body = crate::api::handlers::ErrorBody),
        (status = 404, description = "Account not found", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn recover_password(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<RecoverPasswordRequest>>,
) -> impl IntoResponse {
    let request: RecoverPasswordRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    let otp = request.otp.trim();
    if otp.is_empty() || request.new_pass.is_empty() {
        return bad_request("Missing OTP or new password");
    }

    match service
        .complete_password_recovery(&email, otp, &request.new_pass)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(StatusResponse {
                success: true,
                message: "Password changed successfully".to_string(),
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
    async fn change_password_missing_payload() {
        let response = change_password(service(), Path(Uuid::new_v4()), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn change_password_unknown_account_is_404() {
        let response = change_password(
            service(),
            Path(Uuid::new_v4()),
            Some(Json(ChangePasswordRequest {
                password: "hunter2hunter2".to_string(),
                new_pass: "correct-horse".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn forgot_password_is_uniform_for_unknown_and_invalid_emails() {
        for email in ["nobody@example.com", "not-an-email"] {
            let response = forgot_password(
                service(),
                Some(Json(ForgotPasswordRequest {
                    email: email.to_string(),
                })),
            )
            .await
            .into_response();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn recover_password_blank_otp() {
        let response = recover_password(
            service(),
            Some(Json(RecoverPasswordRequest {
                email: "alice@example.com".to_string(),
                otp: " ".to_string(),
                new_pass: "correct-horse".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recover_password_unknown_account_is_404() {
        let response = recover_password(
            service(),
            Some(Json(RecoverPasswordRequest {
                email: "nobody@example.com".to_string(),
                otp: "123456".to_string(),
                new_pass: "correct-horse".to_string(),
            })),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
