//! User queries.

use chrono::Utc;

use super::{DbError, DbPool};
use crate::models::User;

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, role, password_hash, \
                            is_active, created_at, updated_at";

/// Values for a new row; the caller has validated and hashed them.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Columns to overwrite; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn insert_user(pool: &DbPool, user: &NewUser) -> Result<User, DbError> {
    let id = sqlx::query(
        r#"
        INSERT INTO users (username, email, first_name, last_name, role, password_hash, is_active, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.role)
    .bind(&user.password_hash)
    .bind(user.is_active)
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    get_user(pool, id)
        .await?
        .ok_or_else(|| DbError::Sqlite(sqlx::Error::RowNotFound))
}

pub async fn list_users(pool: &DbPool) -> Result<Vec<User>, DbError> {
    let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(users)
}

pub async fn get_user(pool: &DbPool, id: i64) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Any user already holding `username` or `email`
pub async fn find_by_username_or_email(
    pool: &DbPool,
    username: &str,
    email: &str,
) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = ? OR email = ? LIMIT 1"
    ))
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, DbError> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Apply `changes` to user `id`, returning the updated row or `None` if absent
pub async fn update_user(
    pool: &DbPool,
    id: i64,
    changes: &UserChanges,
) -> Result<Option<User>, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE users SET
            first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            email = COALESCE(?, email),
            role = COALESCE(?, role),
            is_active = COALESCE(?, is_active),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&changes.first_name)
    .bind(&changes.last_name)
    .bind(&changes.email)
    .bind(&changes.role)
    .bind(changes.is_active)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_user(pool, id).await
}

/// Delete user `id`, returning the row as it was
pub async fn delete_user(pool: &DbPool, id: i64) -> Result<Option<User>, DbError> {
    let Some(user) = get_user(pool, id).await? else {
        return Ok(None);
    };

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(Some(user))
}

#[cfg(test)]
pub(crate) fn sample_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        role: "USER".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn insert_and_fetch() {
        let (_dir, pool) = test_pool().await;

        let user = insert_user(&pool, &sample_user("jane")).await.unwrap();

        assert_eq!(user.username, "jane");
        assert!(user.is_active);
        assert!(user.updated_at.is_none());
        let fetched = get_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "jane@example.com");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_schema() {
        let (_dir, pool) = test_pool().await;
        insert_user(&pool, &sample_user("jane")).await.unwrap();

        let mut again = sample_user("jane");
        again.email = "other@example.com".into();
        assert!(insert_user(&pool, &again).await.is_err());
    }

    #[tokio::test]
    async fn lookup_by_username_or_email() {
        let (_dir, pool) = test_pool().await;
        insert_user(&pool, &sample_user("jane")).await.unwrap();

        assert!(find_by_username_or_email(&pool, "jane", "x@example.com")
            .await
            .unwrap()
            .is_some());
        assert!(find_by_username_or_email(&pool, "bob", "jane@example.com")
            .await
            .unwrap()
            .is_some());
        assert!(find_by_username_or_email(&pool, "bob", "bob@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn partial_update_keeps_other_columns() {
        let (_dir, pool) = test_pool().await;
        let user = insert_user(&pool, &sample_user("jane")).await.unwrap();

        let changes = UserChanges {
            last_name: Some("Smith".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = update_user(&pool, user.id, &changes).await.unwrap().unwrap();

        assert_eq!(updated.first_name, "Test");
        assert_eq!(updated.last_name, "Smith");
        assert!(!updated.is_active);
        assert!(updated.updated_at.is_some());
        assert!(update_user(&pool, 999, &changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_row() {
        let (_dir, pool) = test_pool().await;
        let user = insert_user(&pool, &sample_user("jane")).await.unwrap();

        let deleted = delete_user(&pool, user.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, user.id);
        assert!(get_user(&pool, user.id).await.unwrap().is_none());
        assert!(delete_user(&pool, user.id).await.unwrap().is_none());
    }
}
