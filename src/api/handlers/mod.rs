//! API handlers and shared utilities.
//!
//! This module organizes the service's route handlers and provides common
//! functions for input validation and error response mapping.

pub mod account;
pub mod health;
pub mod root;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::account::AccountError;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Uniform error body for every failing endpoint.
///
/// `error` is a stable machine-readable kind; `message` is the human-readable
/// counterpart. Internal causes never reach either field.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: String,
}

/// Map a service failure onto the HTTP status and error body.
pub(crate) fn error_response(err: &AccountError) -> Response {
    let status = match err {
        AccountError::NotFound => StatusCode::NOT_FOUND,
        AccountError::Conflict => StatusCode::CONFLICT,
        AccountError::Internal(cause) => {
            error!("Request failed: {cause:#}");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorBody {
            success: false,
            error: err.kind().to_string(),
            message: err.to_string(),
        }),
    )
        .into_response()
}

/// 400 with the uniform error body, for malformed or missing input.
pub(crate) fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            success: false,
            error: "BAD_REQUEST".to_string(),
            message: message.to_string(),
        }),
    )
        .into_response()
}
