use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::response::{ApiResponse, ApiResult};
use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/git_branches", get(git_branches))
        .route("/git_branch_commit", post(git_branch_commit))
        .route("/git_branch_compare", post(git_branch_compare))
        .route("/git_create_branch", post(git_create_branch))
}

#[derive(Debug, Deserialize)]
pub struct BranchRequest {
    pub branch: String,
}

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub branch1: String,
    pub branch2: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBranchRequest {
    pub new_branch: String,
    pub source_branch: String,
}

async fn git_branches(State(state): State<AppState>) -> ApiResult {
    let branches = state.workspace.branches().await?;

    Ok(ApiResponse::success(
        "Branches retrieved successfully",
        json!({ "branches": branches }),
    ))
}

async fn git_branch_commit(
    State(state): State<AppState>,
    payload: Result<Json<BranchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let commits = state.workspace.commits(&req.branch).await?;

    Ok(ApiResponse::success(
        "Commit hash retrieved successfully",
        json!({ "commit_hash": commits }),
    ))
}

async fn git_branch_compare(
    State(state): State<AppState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let files = state.workspace.compare(&req.branch1, &req.branch2).await?;

    Ok(ApiResponse::success(
        "Branches compared successfully",
        json!({
            "changed_files_count": files.len(),
            "files": files,
        }),
    ))
}

async fn git_create_branch(
    State(state): State<AppState>,
    payload: Result<Json<CreateBranchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let created = state
        .workspace
        .create_branch(&req.new_branch, &req.source_branch)
        .await?;

    Ok(ApiResponse::success(
        "Branch created successfully",
        json!({
            "new_branch": created.new_branch,
            "source_branch": created.source_branch,
            "push_task": created.push,
        }),
    ))
}
