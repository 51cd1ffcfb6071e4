//! OTP verification endpoints.

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

use super::types::{ResendOtpRequest, StatusResponse, VerifyEmailRequest};

/// Re-issue the verification OTP (always returns 200 to avoid user
/// enumeration; verified accounts are a silent no-op).
#[utoipa::path(
    post,
    path = "/verifyAccount/resendOtp",
    request_body = ResendOtpRequest,
    responses(
        (status = 200, description = "Resend accepted", body = StatusResponse),
        (status = 400, description = "Missing payload", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn resend_otp(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<ResendOtpRequest>>,
) -> impl IntoResponse {
    let request: ResendOtpRequest = match payload {
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

    if let Err(err) = service.resend_otp(&email).await {
        // Keep the response opaque; failures only reach the logs.
        error!("Failed to resend verification OTP: {err:#}");
    }
    accepted
}

/// Confirm the OTP for the account addressed by email.
#[utoipa::path(
    post,
    path = "/verifyemail",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email verified", body = StatusResponse),
        (status = 400, description = "Invalid, expired, or missing OTP", body = crate::api::handlers::ErrorBody),
        (status = 404, description = "Account not found", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn verify_email(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> impl IntoResponse {
    let request: VerifyEmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    let otp = request.otp.trim();
    if otp.is_empty() {
        return bad_request("Missing OTP");
    }

    match service.verify_email(&email, otp).await {
        Ok(_) => (
            StatusCode::OK,
            Json(StatusResponse {
                success: true,
                message: "Email verified successfully".to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

/// Confirm the OTP for the account addressed by id; the body email must match
/// the stored one.
#[utoipa::path(
    put,
    path = "/verifyAccount/emailVerify/{id}",
    request_body = VerifyEmailRequest,
    params(
        ("id" = Uuid, Path, description = "Account id")
    ),
    responses(
        (status = 200, description = "Email verified", body = StatusResponse),
        (status = 400, description = "Invalid, expired, or missing OTP", body = crate::api::handlers::ErrorBody),
        (status = 404, description = "Account not found or email mismatch", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn verify_account(
    service: Extension<Arc<AccountService>>,
    Path(id): Path<Uuid>,
    payload: Option<Json<VerifyEmailRequest>>,
) -> impl IntoResponse {
    let request: VerifyEmailRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    let otp = request.otp.trim();
    if otp.is_empty() {
        return bad_request("Missing OTP");
    }

    match service.verify_email_by_id(id, &email, otp).await {
        Ok(_) => (
            StatusCode::OK,
            Json(StatusResponse {
                success: true,
                message: "Email verified successfully".to_string(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
