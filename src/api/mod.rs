use crate::{
    account::{AccountService, otp::OtpIssuer, pg::PgCredentialStore, token::TokenIssuer},
    mail::{HttpMailSender, LogMailSender, MailSender},
};
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension,
    body::Body,
    extract::MatchedPath,
    http::{
        HeaderName, HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post, put},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, info, info_span};
use ulid::Ulid;
use url::Url;

pub(crate) mod handlers;
// OpenAPI document aggregation lives in openapi.rs.
mod openapi;

pub use openapi::openapi;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Transactional mail API settings; absent in local dev, where outbound mail
/// is logged instead of delivered.
#[derive(Clone, Debug)]
pub struct MailApiConfig {
    pub endpoint: String,
    pub api_key: SecretString,
    pub from: String,
}

/// Everything the server needs besides the port and DSN.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub otp_ttl_minutes: i64,
    pub frontend_base_url: String,
    pub mail: Option<MailApiConfig>,
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, config: ApiConfig) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let mail: Arc<dyn MailSender> = match &config.mail {
        Some(mail) => Arc::new(HttpMailSender::new(
            mail.endpoint.clone(),
            mail.api_key.clone(),
            mail.from.clone(),
        )),
        None => {
            info!("No mail API configured, logging outbound mail instead");
            Arc::new(LogMailSender)
        }
    };

    let service = Arc::new(AccountService::new(
        Arc::new(PgCredentialStore::new(pool.clone())),
        OtpIssuer::with_ttl_minutes(config.otp_ttl_minutes),
        TokenIssuer::new(config.token_secret.clone(), config.token_ttl_seconds),
        mail,
    ));

    let frontend_origin = frontend_origin(&config.frontend_base_url)?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_origin(AllowOrigin::exact(frontend_origin))
        .allow_credentials(true);

    let app = axum::Router::new()
        .route("/", get(handlers::root::root))
        .route(
            "/health",
            get(handlers::health::health).options(handlers::health::health),
        )
        .route("/api-docs/openapi.json", get(openapi::serve))
        .route("/signup", post(handlers::account::signup::signup))
        .route(
            "/verifyAccount/resendOtp",
            post(handlers::account::verification::resend_otp),
        )
        .route(
            "/verifyAccount/emailVerify/:id",
            put(handlers::account::verification::verify_account),
        )
        .route(
            "/verifyemail",
            post(handlers::account::verification::verify_email),
        )
        .route("/signin", post(handlers::account::signin::signin))
        .route(
            "/authWithGoogle",
            post(handlers::account::federated::auth_with_google),
        )
        .route(
            "/changePassword/:id",
            put(handlers::account::password::change_password),
        )
        .route(
            "/forgotPassword",
            post(handlers::account::password::forgot_password),
        )
        .route(
            "/forgotPassword/changePassword",
            post(handlers::account::password::recover_password),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(service))
                .layer(Extension(pool)),
        );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}
