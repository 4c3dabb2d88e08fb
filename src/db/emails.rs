//! Email record queries.

use chrono::{DateTime, Utc};

use super::{DbError, DbPool};
use crate::models::{Email, EmailStatus};

const EMAIL_COLUMNS: &str =
    "id, user_id, sender, recipient, subject, body, status, created_at, sent_at";

/// Record an email as `PENDING`
pub async fn insert_email(
    pool: &DbPool,
    user_id: i64,
    sender: &str,
    recipient: &str,
    subject: &str,
    body: &str,
) -> Result<Email, DbError> {
    let id = sqlx::query(
        r#"
        INSERT INTO emails (user_id, sender, recipient, subject, body, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(sender)
    .bind(recipient)
    .bind(subject)
    .bind(body)
    .bind(EmailStatus::Pending.to_string())
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_email(pool, id)
        .await?
        .ok_or_else(|| DbError::Sqlite(sqlx::Error::RowNotFound))
}

/// Set the delivery outcome of email `id`; `sent_at` is only recorded for sent mail
pub async fn set_status(
    pool: &DbPool,
    id: i64,
    status: EmailStatus,
    sent_at: Option<DateTime<Utc>>,
) -> Result<Option<Email>, DbError> {
    sqlx::query("UPDATE emails SET status = ?, sent_at = ? WHERE id = ?")
        .bind(status.to_string())
        .bind(sent_at)
        .bind(id)
        .execute(pool)
        .await?;

    get_email(pool, id).await
}

pub async fn list_emails(pool: &DbPool) -> Result<Vec<Email>, DbError> {
    let emails =
        sqlx::query_as::<_, Email>(&format!("SELECT {EMAIL_COLUMNS} FROM emails ORDER BY id"))
            .fetch_all(pool)
            .await?;
    Ok(emails)
}

pub async fn get_email(pool: &DbPool, id: i64) -> Result<Option<Email>, DbError> {
    let email =
        sqlx::query_as::<_, Email>(&format!("SELECT {EMAIL_COLUMNS} FROM emails WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(email)
}

pub async fn emails_for_user(pool: &DbPool, user_id: i64) -> Result<Vec<Email>, DbError> {
    let emails = sqlx::query_as::<_, Email>(&format!(
        "SELECT {EMAIL_COLUMNS} FROM emails WHERE user_id = ? ORDER BY id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(emails)
}

/// Delete email `id`, returning the row as it was
pub async fn delete_email(pool: &DbPool, id: i64) -> Result<Option<Email>, DbError> {
    let Some(email) = get_email(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM emails WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(Some(email))
}
