use anyhow::{Result, anyhow};
use clap::{Arg, Command};
use secrecy::SecretString;

use crate::api::MailApiConfig;

pub const ARG_MAIL_API_URL: &str = "mail-api-url";
pub const ARG_MAIL_API_KEY: &str = "mail-api-key";
pub const ARG_MAIL_FROM: &str = "mail-from";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_MAIL_API_URL)
                .long(ARG_MAIL_API_URL)
                .help("Transactional mail API endpoint; when unset, outbound mail is logged")
                .env("EMPORIA_MAIL_API_URL"),
        )
        .arg(
            Arg::new(ARG_MAIL_API_KEY)
                .long(ARG_MAIL_API_KEY)
                .help("API key for the transactional mail API")
                .env("EMPORIA_MAIL_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_MAIL_FROM)
                .long(ARG_MAIL_FROM)
                .help("From address for outbound mail")
                .env("EMPORIA_MAIL_FROM")
                .default_value("no-reply@emporia.dev"),
        )
}

/// Extract the optional mail API configuration from parsed matches.
///
/// # Errors
/// Returns an error if an endpoint is configured without an API key.
pub fn parse(matches: &clap::ArgMatches) -> Result<Option<MailApiConfig>> {
    let Some(endpoint) = matches.get_one::<String>(ARG_MAIL_API_URL).cloned() else {
        return Ok(None);
    };
    let api_key = matches
        .get_one::<String>(ARG_MAIL_API_KEY)
        .cloned()
        .ok_or_else(|| anyhow!("--{ARG_MAIL_API_KEY} is required when --{ARG_MAIL_API_URL} is set"))?;
    let from = matches
        .get_one::<String>(ARG_MAIL_FROM)
        .cloned()
        .unwrap_or_else(|| "no-reply@emporia.dev".to_string());
    Ok(Some(MailApiConfig {
        endpoint,
        api_key: SecretString::from(api_key),
        from,
    }))
}
