use anyhow::{Context, Result};
use clap::{Arg, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_OTP_TTL_MINUTES: &str = "otp-ttl-minutes";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign session tokens")
                .env("EMPORIA_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Session token TTL in seconds")
                .env("EMPORIA_TOKEN_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_MINUTES)
                .long(ARG_OTP_TTL_MINUTES)
                .help("OTP challenge TTL in minutes (10 is the standard lifetime; override deliberately)")
                .env("EMPORIA_OTP_TTL_MINUTES")
                .default_value("10")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Storefront base URL, used as the allowed CORS origin")
                .env("EMPORIA_FRONTEND_BASE_URL")
                .default_value("https://shop.emporia.dev"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: i64,
    pub otp_ttl_minutes: i64,
    pub frontend_base_url: String,
}

impl Options {
    /// Extract the auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &clap::ArgMatches) -> Result<Self> {
        let token_secret = matches
            .get_one::<String>(ARG_TOKEN_SECRET)
            .cloned()
            .context("missing required argument: --token-secret")?;
        Ok(Self {
            token_secret: SecretString::from(token_secret),
            token_ttl_seconds: matches
                .get_one::<i64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(86_400),
            otp_ttl_minutes: matches
                .get_one::<i64>(ARG_OTP_TTL_MINUTES)
                .copied()
                .unwrap_or(10),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .unwrap_or_else(|| "https://shop.emporia.dev".to_string()),
        })
    }
}
