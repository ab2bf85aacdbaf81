use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;

use crate::config::Config;
use crate::error::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// Sends plain-text digests to the operator over SMTP with implicit TLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = Credentials::new(
            config.sender_email.clone(),
            config.sender_email_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from: config.sender_email.parse()?,
            to: config.user_email.parse()?,
        })
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        Ok(Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(subject, body)?;
        let response = self.transport.send(message).await?;
        info!("Email '{}' sent to {}: {}", subject, self.to, response.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(sender: &str, user: &str) -> Config {
        Config {
            bind_address: "127.0.0.1:0".to_string(),
            app_token: "token".to_string(),
            alpha_vantage_api_key: String::new(),
            user_email: user.to_string(),
            sender_email: sender.to_string(),
            sender_email_password: "pw".to_string(),
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 465,
            data_dir: PathBuf::from("."),
            quote_dump_dir: None,
            schedule_hour: 23,
            schedule_minute: 0,
            request_delay_secs: 60,
            log_level: "info".to_string(),
        }
    }

    #[tokio::test]
    async fn test_build_message_headers() {
        let mailer = SmtpMailer::from_config(&config("bot@example.com", "me@example.com")).unwrap();
        let message = mailer.build_message("DAILY report for stocks", "body text").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("From: bot@example.com"));
        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("Subject: DAILY report for stocks"));
        assert!(raw.contains("body text"));
    }

    #[tokio::test]
    async fn test_invalid_address_is_rejected() {
        assert!(SmtpMailer::from_config(&config("not-an-address", "me@example.com")).is_err());
    }
}
