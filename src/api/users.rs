use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tracing::info;

use super::response::{ApiResponse, ApiResult};
use super::AppState;
use crate::db::users::{NewUser, UserChanges};
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::mail::validate_email;
use crate::models::{CreateUserRequest, Role, UpdateUserRequest, User, UserIdRequest};
use crate::password::hash_password;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user_create", post(user_create))
        .route("/users_get", get(users_get))
        .route("/user_get_by_id", post(user_get_by_id))
        .route("/user_update", put(user_update))
        .route("/user_delete", delete(user_delete))
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

async fn create_user(pool: &DbPool, req: CreateUserRequest) -> Result<User, AppError> {
    require("username", &req.username)?;
    require("email", &req.email)?;
    let role = match req.role.as_deref() {
        Some(role) => Role::parse(role)?,
        None => Role::default(),
    };
    validate_email(&req.email)?;

    if db::users::find_by_username_or_email(pool, &req.username, &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::validation(
            "User with this username or email already exists",
        ));
    }

    let user = db::users::insert_user(
        pool,
        &NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            role: role.to_string(),
            password_hash: hash_password(&req.password)?,
            is_active: req.is_active.unwrap_or(true),
        },
    )
    .await?;

    info!(id = user.id, username = %user.username, "created user");
    Ok(user)
}

async fn update_user(pool: &DbPool, req: UpdateUserRequest) -> Result<User, AppError> {
    if let Some(email) = &req.email {
        validate_email(email)?;
        if let Some(existing) = db::users::find_by_email(pool, email).await? {
            if existing.id != req.user_id {
                return Err(AppError::validation("User with this email already exists"));
            }
        }
    }
    let role = req.role.as_deref().map(Role::parse).transpose()?;

    let changes = UserChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        email: req.email,
        role: role.map(|r| r.to_string()),
        is_active: req.is_active,
    };

    db::users::update_user(pool, req.user_id, &changes)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

async fn user_create(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let user = create_user(&state.db, req).await?;

    Ok(ApiResponse::success(
        "New user created successfully",
        json!({ "user": user }),
    ))
}

async fn users_get(State(state): State<AppState>) -> ApiResult {
    let users = db::users::list_users(&state.db).await?;

    Ok(ApiResponse::success(
        "Users fetched successfully",
        json!({ "user": users }),
    ))
}

async fn user_get_by_id(
    State(state): State<AppState>,
    payload: Result<Json<UserIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let user = db::users::get_user(&state.db, req.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ApiResponse::success(
        "User fetched successfully",
        json!({ "user": user }),
    ))
}

async fn user_update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let user = update_user(&state.db, req).await?;

    Ok(ApiResponse::success(
        "User updated successfully",
        json!({ "user": user }),
    ))
}

async fn user_delete(
    State(state): State<AppState>,
    payload: Result<Json<UserIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let user = db::users::delete_user(&state.db, req.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    info!(id = user.id, "deleted user");

    Ok(ApiResponse::success(
        "User deleted successfully",
        json!({ "user": user }),
    ))
}
