//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the
//! appropriate action, such as starting the API server.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{auth, mail};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;
    let mail_config = mail::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        token_secret: auth_opts.token_secret,
        token_ttl_seconds: auth_opts.token_ttl_seconds,
        otp_ttl_minutes: auth_opts.otp_ttl_minutes,
        frontend_base_url: auth_opts.frontend_base_url,
        mail: mail_config,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mail_api_key_required_with_url() {
        temp_env::with_vars(
            [
                (
                    "EMPORIA_DSN",
                    Some("postgres://user@localhost:5432/emporia"),
                ),
                ("EMPORIA_TOKEN_SECRET", Some("hush")),
                (
                    "EMPORIA_MAIL_API_URL",
                    Some("https://api.brevo.com/v3/smtp/email"),
                ),
                ("EMPORIA_MAIL_API_KEY", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["emporia"]);
                let result = handler(&matches);
                assert!(result.is_err());
                if let Err(err) = result {
                    assert!(err.to_string().contains("--mail-api-key"));
                }
            },
        );
    }

    #[test]
    fn server_action_carries_the_parsed_config() {
        temp_env::with_vars(
            [
                (
                    "EMPORIA_DSN",
                    Some("postgres://user@localhost:5432/emporia"),
                ),
                ("EMPORIA_TOKEN_SECRET", Some("hush")),
                ("EMPORIA_MAIL_API_URL", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["emporia", "--port", "9000"]);
                let action = handler(&matches).ok();
                let Some(Action::Server(args)) = action else {
                    panic!("expected a server action");
                };
                assert_eq!(args.port, 9000);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/emporia");
                assert_eq!(args.token_ttl_seconds, 86_400);
                assert_eq!(args.otp_ttl_minutes, 10);
                assert!(args.mail.is_none());
            },
        );
    }
}
