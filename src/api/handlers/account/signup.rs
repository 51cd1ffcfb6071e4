//! Registration endpoint.

use axum::{
    Json,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::account::AccountService;
use crate::account::service::Registration;
use crate::api::handlers::{bad_request, error_response, normalize_email, valid_email};

use super::types::{AuthResponse, SignupRequest};

/// Register an account (or re-register an unverified one) and dispatch the
/// verification OTP by email. The OTP itself never appears in the response.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Registered; verification OTP dispatched", body = AuthResponse),
        (status = 400, description = "Missing or malformed payload", body = crate::api::handlers::ErrorBody),
        (status = 409, description = "Email or phone already belongs to another account", body = crate::api::handlers::ErrorBody),
        (status = 500, description = "Registration failed", body = crate::api::handlers::ErrorBody)
    ),
    tag = "account"
)]
pub async fn signup(
    service: Extension<Arc<AccountService>>,
    payload: Option<Json<SignupRequest>>,
) -> impl IntoResponse {
    let request: SignupRequest = match payload {
        Some(Json(payload)) => payload,
        None => return bad_request("Missing payload"),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return bad_request("Invalid email");
    }
    if request.name.trim().is_empty()
        || request.phone.trim().is_empty()
        || request.password.is_empty()
    {
        return bad_request("Missing name, phone, or password");
    }

    let registration = Registration {
        name: request.name.trim().to_string(),
        phone: request.phone.trim().to_string(),
        email,
        password: request.password,
    };

    match service.sign_up(registration).await {
        Ok((account, token)) => (
            StatusCode::OK,
            Json(AuthResponse {
                success: true,
                message: "Account registered, please verify your email".to_string(),
                token,
                user: (&account).into(),
            }),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}
