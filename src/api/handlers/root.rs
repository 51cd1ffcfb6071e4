//! Service banner for `GET /`.

use axum::response::IntoResponse;

use crate::api::APP_USER_AGENT;

pub async fn root() -> impl IntoResponse {
    APP_USER_AGENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn root_returns_the_service_banner() {
        let response = root().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
