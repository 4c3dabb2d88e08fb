//! HTTP surface, mounted under `/api/v1`.

pub mod email;
pub mod files;
pub mod git;
pub mod pushes;
pub mod response;
pub mod users;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::db::DbPool;
use crate::mail::MailTransport;
use crate::workspace::Workspace;
use response::{ApiResponse, ApiResult};

#[derive(Clone)]
pub struct AppState {
    pub workspace: Workspace,
    pub db: DbPool,
    pub mailer: Arc<dyn MailTransport>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .merge(files::routes())
        .merge(git::routes())
        .merge(pushes::routes())
        .merge(email::routes())
        .merge(users::routes());

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> ApiResult {
    Ok(ApiResponse::success("Service is healthy", json!({"status": "ok"})))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::{router, AppState};
    use crate::db::test_pool;
    use crate::git::GitRepo;
    use crate::mail::testing::RecordingMailer;
    use crate::push::outbox::testing::RecordingPusher;
    use crate::workspace::testing::recording_workspace;

    pub struct TestApp {
        pub router: Router,
        pub state: AppState,
        pub mailer: Arc<RecordingMailer>,
        pub pusher: Arc<RecordingPusher>,
        _db_dir: assert_fs::TempDir,
    }

    pub async fn test_app(repo: GitRepo) -> TestApp {
        test_app_with_mailer(repo, RecordingMailer::default()).await
    }

    pub async fn test_app_with_mailer(repo: GitRepo, mailer: RecordingMailer) -> TestApp {
        let (db_dir, db) = test_pool().await;
        let (workspace, pusher) = recording_workspace(repo);
        let mailer = Arc::new(mailer);
        let state = AppState {
            workspace,
            db,
            mailer: mailer.clone(),
        };

        TestApp {
            router: router(state.clone()),
            state,
            mailer,
            pusher,
            _db_dir: db_dir,
        }
    }

    impl TestApp {
        /// Send a request and return the status with the decoded envelope
        pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json");
            let request = match body {
                Some(body) => request.body(Body::from(body.to_string())).unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, value)
        }

        pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
            self.call(Method::POST, uri, Some(body)).await
        }

        pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.call(Method::GET, uri, None).await
        }
    }
}
