//! Outgoing notification email.
//!
//! Every send is recorded first as `PENDING` and then marked `SENT` or
//! `FAILED` once the relay has answered.

pub mod smtp;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info};

use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::{Email, EmailStatus, SendEmailRequest};

pub use smtp::SmtpMailer;

/// Accept addresses that are non-empty, contain `@` and end with `.com`
pub fn validate_email(email: &str) -> Result<&str, AppError> {
    if email.is_empty() {
        return Err(AppError::validation("Email cannot be empty"));
    }
    if !email.contains('@') || !email.to_lowercase().ends_with(".com") {
        return Err(AppError::validation(
            "Email must contain '@' and end with '.com' (e.g. user@example.com)",
        ));
    }
    Ok(email)
}

/// Display name guessed from the local part: `jane.doe_42@x.com` is `Jane Doe`
pub fn format_name_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();

    local
        .split(['.', '_', ' '])
        .map(|part| part.chars().filter(|c| c.is_ascii_alphabetic()).collect::<String>())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and lower-case the rest: `JANE DOE` is `Jane doe`
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Wrap `body` in the greeting, sign-off and footer layout
pub fn format_email_body(recipient: &str, body: &str) -> String {
    let greeting = format_name_from_email(recipient).to_uppercase();
    let name = capitalize(&greeting);

    format!(
        r#"<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; background-color: #f9f9f9; padding: 20px; color: #333; }}
        .container {{ max-width: 600px; background: #ffffff; padding: 20px; border-radius: 8px; }}
        .footer {{ font-size: 12px; color: #777; margin-top: 20px; border-top: 1px solid #eee; padding-top: 10px; }}
    </style>
</head>
<body>
    <div class="container">
        <div>
            <p>Dear {greeting},</p>
            <p>{body}</p>
            <p>Regards,<br>{name}</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>
"#
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Address recorded as the sender of every email
    fn sender(&self) -> &str;

    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError>;
}

/// Stand-in used when SMTP settings are incomplete; every send fails with `reason`
pub struct UnconfiguredMailer {
    reason: String,
}

impl UnconfiguredMailer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl MailTransport for UnconfiguredMailer {
    fn sender(&self) -> &str {
        ""
    }

    async fn send(&self, _email: &OutgoingEmail) -> Result<(), AppError> {
        Err(AppError::Mail(format!(
            "Email sending is not configured: {}",
            self.reason
        )))
    }
}

/// Validate, record, send and mark the outcome of one email
pub async fn send_and_record(
    pool: &DbPool,
    mailer: &dyn MailTransport,
    request: &SendEmailRequest,
) -> Result<Email, AppError> {
    validate_email(&request.recipient)?;

    if db::users::get_user(pool, request.user_id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "User with id {} not found",
            request.user_id
        )));
    }

    let email = db::emails::insert_email(
        pool,
        request.user_id,
        mailer.sender(),
        &request.recipient,
        &request.subject,
        &request.body,
    )
    .await?;

    let outgoing = OutgoingEmail {
        to: request.recipient.clone(),
        subject: request.subject.clone(),
        html_body: format_email_body(&request.recipient, &request.body),
    };

    match mailer.send(&outgoing).await {
        Ok(()) => {
            info!(id = email.id, recipient = %request.recipient, "email sent");
            db::emails::set_status(pool, email.id, EmailStatus::Sent, Some(Utc::now()))
                .await?
                .ok_or_else(|| AppError::not_found(format!("Email {} disappeared", email.id)))
        }
        Err(e) => {
            error!(id = email.id, recipient = %request.recipient, error = %e, "email failed");
            db::emails::set_status(pool, email.id, EmailStatus::Failed, None).await?;
            Err(e)
        }
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{MailTransport, OutgoingEmail};
    use crate::error::AppError;

    /// Keeps sent mail in memory; optionally fails every send
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<OutgoingEmail>>,
        pub fail_with: Option<String>,
    }

    impl RecordingMailer {
        pub fn failing(message: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }

        pub fn sent(&self) -> Vec<OutgoingEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        fn sender(&self) -> &str {
            "notifications@example.com"
        }

        async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
            match &self.fail_with {
                Some(message) => Err(AppError::Mail(message.clone())),
                None => {
                    self.sent.lock().unwrap().push(email.clone());
                    Ok(())
                }
            }
        }
    }
}
