use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::response::{ApiResponse, ApiResult};
use super::AppState;
use crate::workspace::content::{ContentFormat, FileContent};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/file_edit", post(file_edit))
        .route("/file_content", post(file_content))
        .route("/file_create", post(file_create))
}

#[derive(Debug, Deserialize)]
pub struct FileEditRequest {
    pub branch: String,
    pub file_path: String,
    pub content: Value,
    #[serde(default)]
    pub format: ContentFormat,
}

#[derive(Debug, Deserialize)]
pub struct FileContentRequest {
    pub branch: String,
    pub file_path: String,
}

#[derive(Debug, Deserialize)]
pub struct FileCreateRequest {
    pub branch: String,
    pub folder: String,
    pub file_name: String,
}

async fn file_edit(
    State(state): State<AppState>,
    payload: Result<Json<FileEditRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    let content = FileContent::from_request(req.format, req.content)?;

    let edited = state
        .workspace
        .edit_file(&req.branch, &req.file_path, content)
        .await?;

    Ok(ApiResponse::success(
        "New file content updated successfully",
        json!({
            "branch": edited.branch,
            "file_path": edited.file_path,
            "content": edited.content,
            "push_task": edited.push,
        }),
    ))
}

async fn file_content(
    State(state): State<AppState>,
    payload: Result<Json<FileContentRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let read = state.workspace.read_file(&req.branch, &req.file_path).await?;

    Ok(ApiResponse::success(
        "File content retrieved successfully",
        json!({
            "branch": read.branch,
            "file_path": read.file_path,
            "content": read.content,
        }),
    ))
}

async fn file_create(
    State(state): State<AppState>,
    payload: Result<Json<FileCreateRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;

    let created = state
        .workspace
        .create_file(&req.branch, &req.folder, &req.file_name)
        .await?;

    Ok(ApiResponse::success(
        "File created successfully",
        json!({
            "branch": created.branch,
            "file_path": created.file_path,
            "push_task": created.push,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::api::testing::test_app;
    use crate::push::outbox::testing::wait_for;
    use crate::test_utils::{create_test_repo_with_origin, RepoTestOperations};

    #[tokio::test]
    async fn create_then_read_lunch_record() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        std::fs::create_dir_all(repo.path().join("food")).unwrap();
        let app = test_app(repo).await;

        let (status, body) = app
            .post(
                "/api/v1/file_create",
                json!({"branch": "1.0", "folder": "food", "file_name": "lunch.json"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["file_path"], "food/lunch.json");
        assert_eq!(body["data"]["push_task"]["branch"], "v/1.0");

        let (status, body) = app
            .post(
                "/api/v1/file_content",
                json!({"branch": "1.0", "file_path": "food/lunch.json"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let content = &body["data"]["content"];
        assert_eq!(content["category"], "food");
        assert_eq!(content["item"], "");
        let keys: Vec<&str> = content
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec!["timestamp", "category", "item", "quantity", "unit", "priority", "notes"]
        );
    }

    #[tokio::test]
    async fn edit_writes_pretty_json_and_pushes_once() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v_/2.1.0"]);
        repo.add_file("data.json", "{}").unwrap();
        let root = repo.path().to_path_buf();
        let app = test_app(repo).await;

        let (status, body) = app
            .post(
                "/api/v1/file_edit",
                json!({"branch": "2.1.0", "file_path": "data.json", "content": {"a": 1}}),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["branch"], "v_/2.1.0");
        assert_eq!(body["data"]["content"], json!({"a": 1}));
        assert_eq!(
            std::fs::read_to_string(root.join("data.json")).unwrap(),
            "{\n    \"a\": 1\n}"
        );

        let id = body["data"]["push_task"]["id"].as_u64().unwrap();
        wait_for(app.state.workspace.pushes(), id).await;
        assert_eq!(app.pusher.branches(), vec!["v_/2.1.0"]);
    }

    #[tokio::test]
    async fn edit_text_format_stores_raw_string() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        repo.add_file("notes.txt", "old").unwrap();
        let root = repo.path().to_path_buf();
        let app = test_app(repo).await;

        let (status, _) = app
            .post(
                "/api/v1/file_edit",
                json!({"branch": "1.0", "file_path": "notes.txt", "content": "new text", "format": "text"}),
            )
            .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(std::fs::read_to_string(root.join("notes.txt")).unwrap(), "new text");
    }

    #[tokio::test]
    async fn edit_rejects_bad_inputs() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        repo.add_file("data.json", "{}").unwrap();
        let app = test_app(repo).await;

        let cases = [
            (json!({"branch": "v1.0", "file_path": "data.json", "content": {}}), StatusCode::BAD_REQUEST),
            (json!({"branch": "1.0", "file_path": "null", "content": {}}), StatusCode::BAD_REQUEST),
            (json!({"branch": "1.0", "file_path": "42", "content": {}}), StatusCode::BAD_REQUEST),
            (json!({"branch": "3.0", "file_path": "data.json", "content": {}}), StatusCode::NOT_FOUND),
            (json!({"branch": "1.0", "file_path": "gone.json", "content": {}}), StatusCode::NOT_FOUND),
            (json!({"branch": "1.0", "file_path": "data.json", "content": 1, "format": "text"}), StatusCode::BAD_REQUEST),
        ];

        for (request, expected) in cases {
            let (status, body) = app.post("/api/v1/file_edit", request.clone()).await;
            assert_eq!(status, expected, "{request} -> {body}");
            assert_eq!(body["status"], "error");
        }
        assert!(app.state.workspace.pushes().list().is_empty());
    }

    #[tokio::test]
    async fn create_existing_local_file_is_bad_request() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        repo.add_file("food/lunch.json", "{}").unwrap();
        let app = test_app(repo).await;

        let (status, body) = app
            .post(
                "/api/v1/file_create",
                json!({"branch": "1.0", "folder": "food", "file_name": "lunch.json"}),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("exists locally but not in remote"));
    }

    #[tokio::test]
    async fn git_metadata_is_off_limits() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        let root = repo.path().to_path_buf();
        std::fs::create_dir_all(root.join(".git/hooks")).unwrap();
        let config_before = std::fs::read(root.join(".git/config")).unwrap();
        let app = test_app(repo).await;

        let (status, _) = app
            .post(
                "/api/v1/file_edit",
                json!({"branch": "1.0", "file_path": ".git/config", "content": "[core]", "format": "text"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(std::fs::read(root.join(".git/config")).unwrap(), config_before);

        let (status, _) = app
            .post(
                "/api/v1/file_create",
                json!({"branch": "1.0", "folder": ".git/hooks", "file_name": "post-commit"}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!root.join(".git/hooks/post-commit").exists());
        assert!(app.state.workspace.pushes().list().is_empty());
    }

    #[tokio::test]
    async fn create_in_missing_folder_is_not_found() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        let app = test_app(repo).await;

        let (status, _) = app
            .post(
                "/api/v1/file_create",
                json!({"branch": "1.0", "folder": "food", "file_name": "lunch.json"}),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn content_of_path_missing_from_branch_is_not_found() {
        let (_local, _remote, repo) = create_test_repo_with_origin(&["v/1.0"]);
        repo.add_file("draft.json", "{}").unwrap();
        let app = test_app(repo).await;

        let (status, body) = app
            .post(
                "/api/v1/file_content",
                json!({"branch": "1.0", "file_path": "draft.json"}),
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "File not found in the specified branch");
    }
}
