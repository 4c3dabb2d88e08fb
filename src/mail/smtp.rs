use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{MailTransport, OutgoingEmail};
use crate::config::{SmtpConfig, SmtpSecurity};
use crate::error::AppError;

/// Sends HTML mail through an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sender: String,
}

impl SmtpMailer {
    pub fn from_config(config: &SmtpConfig) -> Result<Self, AppError> {
        let sender = config
            .sender()
            .ok_or_else(|| AppError::Mail("smtp.from or smtp.username must be set".to_string()))?
            .to_string();
        let from: Mailbox = sender
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid sender address '{sender}': {e}")))?;

        let builder = match config.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host),
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            }
            SmtpSecurity::Plain => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                config.host.as_str(),
            )),
        }
        .map_err(|e| AppError::Mail(format!("Invalid SMTP relay '{}': {e}", config.host)))?
        .port(config.port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: builder.build(),
            from,
            sender,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn sender(&self) -> &str {
        &self.sender
    }

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::Mail(format!("Invalid recipient '{}': {e}", email.to)))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html_body.clone())
            .map_err(|e| AppError::Mail(format!("Failed to build email: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}
