use crate::api::{self, ApiConfig, MailApiConfig};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub otp_ttl_minutes: i64,
    pub frontend_base_url: String,
    pub mail: Option<MailApiConfig>,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let config = ApiConfig {
        token_secret: args.token_secret,
        token_ttl_seconds: args.token_ttl_seconds,
        otp_ttl_minutes: args.otp_ttl_minutes,
        frontend_base_url: args.frontend_base_url,
        mail: args.mail,
    };

    api::new(args.port, args.dsn, config).await
}
