//! Deferred branch pushes.
//!
//! Handlers schedule a push once their commit is in place and answer the
//! request right away. A single worker drains the queue in order and records
//! the outcome of every push in the [`PushOutbox`].

pub mod outbox;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::workspace::SharedRepo;

pub use outbox::PushOutbox;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    Pending,
    Succeeded,
    Failed,
}

impl std::fmt::Display for PushStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One scheduled `push <remote> <branch>` and what became of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushTask {
    pub id: u64,
    pub remote: String,
    pub branch: String,
    pub status: PushStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl PushTask {
    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.status != PushStatus::Pending
    }
}

#[async_trait]
pub trait BranchPusher: Send + Sync {
    async fn push(&self, remote: &str, branch: &str) -> anyhow::Result<()>;
}

/// Pushes through the shared repository, so a push waits for any commit in
/// progress to finish.
pub struct GitPusher {
    repo: SharedRepo,
}

impl GitPusher {
    pub fn new(repo: SharedRepo) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl BranchPusher for GitPusher {
    async fn push(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let remote = remote.to_string();
        let branch = branch.to_string();
        self.repo
            .run(move |repo| repo.push(&remote, &branch).map_err(AppError::git))
            .await?;
        Ok(())
    }
}
