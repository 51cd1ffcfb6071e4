//! Outbound mail delivery.
//!
//! The account service hands messages to a [`MailSender`] on a spawned task:
//! delivery is fire-and-forget with at-least-once semantics and no ordering
//! guarantee relative to the next request. A failed send is logged and never
//! rolls back the operation that produced it; the caller can always request
//! a resend.
//!
//! `LogMailSender` is the local-dev sender and logs instead of delivering.
//! `HttpMailSender` posts to a transactional mail API (Brevo-style JSON
//! endpoint authenticated with an `api-key` header).

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Mail delivery abstraction; implementations decide the transport.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Deliver a message or return an error for the caller to log.
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// Local dev sender that logs the envelope instead of sending real mail.
///
/// The body (which carries the OTP) is logged at debug only.
#[derive(Clone, Debug, Default)]
pub struct LogMailSender;

#[async_trait]
impl MailSender for LogMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "mail send stub"
        );
        debug!(text = %message.text, "mail send stub body");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiMailBody<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text_content: &'a str,
    html_content: &'a str,
}

/// Sender backed by an HTTP mail API.
pub struct HttpMailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    from: String,
}

impl HttpMailSender {
    #[must_use]
    pub fn new(endpoint: String, api_key: SecretString, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl MailSender for HttpMailSender {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let body = ApiMailBody {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            text_content: &message.text,
            html_content: &message.html,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .context("failed to reach mail API")?;

        let status = response.status();
        if !status.is_success() {
            bail!("mail API rejected message: {status}");
        }

        debug!(to = %message.to, subject = %message.subject, "mail delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() -> Result<()> {
        let sender = LogMailSender;
        sender
            .send(&MailMessage {
                to: "alice@example.com".to_string(),
                subject: "Verify Email".to_string(),
                text: "Your OTP is 123456".to_string(),
                html: "<p>Your OTP is <strong>123456</strong></p>".to_string(),
            })
            .await?;
        Ok(())
    }

    #[test]
    fn api_body_serializes_camel_case() -> Result<()> {
        let body = ApiMailBody {
            from: "no-reply@emporia.dev",
            to: "alice@example.com",
            subject: "Verify Email",
            text_content: "Your OTP is 123456",
            html_content: "<p>123456</p>",
        };
        let value = serde_json::to_value(body)?;
        assert!(value.get("textContent").is_some());
        assert!(value.get("htmlContent").is_some());
        assert!(value.get("text_content").is_none());
        Ok(())
    }
}
