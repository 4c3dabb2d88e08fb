//! Outgoing email records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

impl From<&str> for EmailStatus {
    fn from(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "SENT" => Self::Sent,
            "FAILED" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Sent => write!(f, "SENT"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// An email as recorded before and after delivery.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Email {
    pub id: i64,
    pub user_id: i64,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    /// Body as submitted, before the HTML layout is applied
    pub body: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Email {
    pub fn status(&self) -> EmailStatus {
        EmailStatus::from(self.status.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendEmailRequest {
    pub user_id: i64,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailIdRequest {
    pub email_id: i64,
}
