use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;

use crate::config::MailConfig;
use crate::domain::authentication::errors::MailerError;
use crate::domain::authentication::ports::Mailer;
use crate::domain::user::models::EmailAddress;

/// SMTP mail delivery.
///
/// Runs in log-only mode when no SMTP host is configured, so local
/// development needs no mail infrastructure.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Option<Arc<AsyncSmtpTransport<Tokio1Executor>>>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Build the mailer from configuration.
    ///
    /// # Errors
    /// * `InvalidAddress` - `from` is not a valid mailbox
    /// * `SendFailed` - SMTP relay could not be configured
    pub fn new(config: &MailConfig) -> Result<Self, MailerError> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(e.to_string()))?;

        if config.smtp_host.trim().is_empty() {
            tracing::warn!("SMTP host not configured; mailer runs in log-only mode");
            return Ok(Self {
                transport: None,
                from,
            });
        }

        let builder = if config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| MailerError::SendFailed(e.to_string()))?
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: Some(Arc::new(builder.build())),
            from,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        to: &EmailAddress,
        subject: &str,
        html_body: &str,
    ) -> Result<(), MailerError> {
        let Some(transport) = &self.transport else {
            tracing::info!(subject, "Mailer in log-only mode; message not sent");
            return Ok(());
        };

        let recipient = to
            .as_str()
            .parse::<Mailbox>()
            .map_err(|e| MailerError::InvalidAddress(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| MailerError::BuildFailed(e.to_string()))?;

        transport
            .send(message)
            .await
            .map_err(|e| MailerError::SendFailed(e.to_string()))?;
        tracing::info!(subject, "Mail sent");

        Ok(())
    }
}
