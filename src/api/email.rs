use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use super::response::{ApiResponse, ApiResult};
use super::AppState;
use crate::db;
use crate::error::AppError;
use crate::mail;
use crate::models::{EmailIdRequest, SendEmailRequest, UserIdRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/email_send", post(email_send))
        .route("/send_email", post(email_send))
        .route("/emails", get(emails))
        .route("/email_get_by_id", post(email_get_by_id))
        .route("/emails_by_user", post(emails_by_user))
        .route("/email_delete", delete(email_delete))
}

async fn email_send(
    State(state): State<AppState>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let email = mail::send_and_record(&state.db, state.mailer.as_ref(), &req).await?;

    Ok(ApiResponse::success(
        "Email sent successfully.",
        json!({ "email": email }),
    ))
}

async fn emails(State(state): State<AppState>) -> ApiResult {
    let emails = db::emails::list_emails(&state.db).await?;

    Ok(ApiResponse::success(
        "Emails fetched successfully",
        json!({ "emails": emails }),
    ))
}

async fn email_get_by_id(
    State(state): State<AppState>,
    payload: Result<Json<EmailIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let email = db::emails::get_email(&state.db, req.email_id)
        .await?
        .ok_or_else(|| AppError::not_found("Email not found"))?;

    Ok(ApiResponse::success(
        "Email fetched successfully",
        json!({ "email": email }),
    ))
}

async fn emails_by_user(
    State(state): State<AppState>,
    payload: Result<Json<UserIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    if db::users::get_user(&state.db, req.user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    let emails = db::emails::emails_for_user(&state.db, req.user_id).await?;

    Ok(ApiResponse::success(
        "Emails fetched successfully",
        json!({ "emails": emails }),
    ))
}

async fn email_delete(
    State(state): State<AppState>,
    payload: Result<Json<EmailIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let email = db::emails::delete_email(&state.db, req.email_id)
        .await?
        .ok_or_else(|| AppError::not_found("Email not found"))?;

    Ok(ApiResponse::success(
        "Email deleted successfully",
        json!({ "email": email }),
    ))
}
