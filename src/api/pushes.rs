use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::response::{ApiResponse, ApiResult};
use super::AppState;
use crate::error::AppError;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/push_tasks", get(push_tasks))
        .route("/push_task", post(push_task))
}

#[derive(Debug, Deserialize)]
pub struct PushTaskRequest {
    pub id: u64,
}

async fn push_tasks(State(state): State<AppState>) -> ApiResult {
    let tasks = state.workspace.pushes().list();

    Ok(ApiResponse::success(
        "Push tasks retrieved successfully",
        json!({ "tasks": tasks }),
    ))
}

async fn push_task(
    State(state): State<AppState>,
    payload: Result<Json<PushTaskRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let task = state
        .workspace
        .pushes()
        .get(req.id)
        .ok_or_else(|| AppError::not_found(format!("Push task {} not found", req.id)))?;

    Ok(ApiResponse::success(
        "Push task retrieved successfully",
        json!({ "task": task }),
    ))
}
