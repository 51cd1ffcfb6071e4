//! OpenAPI document aggregation.
//!
//! Add new endpoints to `paths(...)` so they show up in the served document;
//! undocumented routes like `GET /` are intentionally left out.

use axum::Json;
use utoipa::OpenApi;

use crate::api::handlers::{self, account};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        account::signup::signup,
        account::verification::resend_otp,
        account::verification::verify_email,
        account::verification::verify_account,
        account::signin::signin,
        account::federated::auth_with_google,
        account::password::change_password,
        account::password::forgot_password,
        account::password::recover_password,
    ),
    components(schemas(
        handlers::ErrorBody,
        handlers::health::Health,
        account::types::SignupRequest,
        account::types::ResendOtpRequest,
        account::types::VerifyEmailRequest,
        account::types::SigninRequest,
        account::types::GoogleAuthRequest,
        account::types::ChangePasswordRequest,
        account::types::ForgotPasswordRequest,
        account::types::RecoverPasswordRequest,
        account::types::AccountBody,
        account::types::AuthResponse,
        account::types::StatusResponse,
    )),
    tags(
        (name = "account", description = "Account identity and OTP verification"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Serve the aggregated document at `/api-docs/openapi.json`.
pub async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_account_route_is_documented() {
        let spec = openapi();
        for path in [
            "/signup",
            "/verifyAccount/resendOtp",
            "/verifyAccount/emailVerify/{id}",
            "/verifyemail",
            "/signin",
            "/authWithGoogle",
            "/changePassword/{id}",
            "/forgotPassword",
            "/forgotPassword/changePassword",
            "/health",
        ] {
            assert!(
                spec.paths.paths.contains_key(path),
                "missing path {path} in OpenAPI document"
            );
        }
    }
}
