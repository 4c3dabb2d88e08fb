//! Branch and file workflows over the managed repository.
//!
//! Every operation runs on the blocking pool while holding the one lock around
//! the [`GitRepo`], so the index reset, stage and commit of one request never
//! interleave with another's. Pushes are handed to the [`PushOutbox`] after
//! the lock is released.

pub mod branch;
pub mod branches;
pub mod content;
pub mod files;
pub mod paths;
pub mod reconcile;
pub mod template;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::AppError;
use crate::git::{CommitInfo, FileChange, GitRepo};
use crate::push::{PushOutbox, PushTask};
use content::FileContent;

/// Git and I/O failures while creating a file are reported as conflicts
fn creation_conflict(err: AppError) -> AppError {
    match err {
        AppError::Git(message) | AppError::Internal(message) => AppError::Conflict(message),
        other => other,
    }
}

/// Single-writer handle to the repository, cheap to clone.
#[derive(Clone)]
pub struct SharedRepo {
    inner: Arc<Mutex<GitRepo>>,
    root: PathBuf,
}

impl SharedRepo {
    pub fn new(repo: GitRepo) -> Self {
        let root = repo.path().to_path_buf();
        Self {
            inner: Arc::new(Mutex::new(repo)),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `f` against the repository on the blocking pool, holding the lock
    pub async fn run<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&GitRepo) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let repo = inner
                .lock()
                .map_err(|_| AppError::internal("repository lock poisoned"))?;
            f(&repo)
        })
        .await
        .map_err(|e| AppError::internal(format!("repository task failed: {e}")))?
    }
}

#[derive(Debug, Clone)]
pub struct EditedFile {
    pub branch: String,
    pub file_path: String,
    pub content: Value,
    pub push: PushTask,
}

#[derive(Debug, Clone)]
pub struct FileRead {
    pub branch: String,
    pub file_path: String,
    pub content: Value,
}

#[derive(Debug, Clone)]
pub struct CreatedFile {
    pub branch: String,
    pub file_path: String,
    pub push: PushTask,
}

#[derive(Debug, Clone)]
pub struct NewBranch {
    pub new_branch: String,
    pub source_branch: String,
    pub push: PushTask,
}

/// The managed repository together with where its pushes go.
#[derive(Clone)]
pub struct Workspace {
    repo: SharedRepo,
    pushes: PushOutbox,
}

impl Workspace {
    pub fn new(repo: SharedRepo, pushes: PushOutbox) -> Self {
        Self { repo, pushes }
    }

    pub fn pushes(&self) -> &PushOutbox {
        &self.pushes
    }

    fn remote(&self) -> String {
        self.pushes.remote().to_string()
    }

    pub async fn edit_file(
        &self,
        version: &str,
        file_path: &str,
        content: FileContent,
    ) -> Result<EditedFile, AppError> {
        let remote = self.remote();
        let root = self.repo.root().to_path_buf();
        let version = version.to_string();
        let file_path = file_path.to_string();

        let (branch, file_path, content) = self
            .repo
            .run(move |repo| {
                let branch = branch::validate_branch_name(repo, &remote, &version)?;
                let file_path = paths::validate_file_path(&file_path, &root)?;
                files::write_and_commit(repo, &branch, &file_path, &content)?;
                Ok((branch, file_path, content))
            })
            .await?;

        let push = self.pushes.schedule(&branch);
        Ok(EditedFile {
            branch,
            file_path,
            content: content.to_value(),
            push,
        })
    }

    pub async fn read_file(&self, version: &str, file_path: &str) -> Result<FileRead, AppError> {
        let remote = self.remote();
        let root = self.repo.root().to_path_buf();
        let version = version.to_string();
        let file_path = file_path.to_string();

        self.repo
            .run(move |repo| {
                let branch = branch::validate_branch_name(repo, &remote, &version)?;
                let file_path = paths::validate_file_path(&file_path, &root)?;
                let content = files::read_json(repo, &remote, &branch, &file_path)?;
                Ok(FileRead {
                    branch,
                    file_path,
                    content,
                })
            })
            .await
    }

    /// Seed a new file on a branch. Every failure past input validation is a conflict.
    pub async fn create_file(
        &self,
        version: &str,
        folder: &str,
        file_name: &str,
    ) -> Result<CreatedFile, AppError> {
        if file_name.trim().is_empty() || file_name.contains('/') {
            return Err(AppError::validation(
                "File name must be non-empty and must not contain '/'",
            ));
        }
        if file_name == "." || file_name == ".." || paths::is_git_dir_name(file_name) {
            return Err(AppError::validation(format!(
                "File name '{file_name}' is reserved"
            )));
        }

        let remote = self.remote();
        let root = self.repo.root().to_path_buf();
        let version = version.to_string();
        let folder = folder.to_string();
        let file_name = file_name.to_string();

        let (branch, file_path) = self
            .repo
            .run(move |repo| {
                let branch = branch::validate_branch_name(repo, &remote, &version)?;
                let folder = paths::validate_folder_path(&folder, &root)?;
                let file_path = format!("{folder}/{file_name}");

                reconcile::check_file_existence(repo, &remote, &branch, &file_path)
                    .and_then(|()| {
                        files::create_seeded_file(repo, &remote, &branch, &folder, &file_name)
                    })
                    .map(|file_path| (branch, file_path))
                    .map_err(creation_conflict)
            })
            .await?;

        let push = self.pushes.schedule(&branch);
        Ok(CreatedFile {
            branch,
            file_path,
            push,
        })
    }

    /// Every failure of branch creation is reported as an internal error.
    pub async fn create_branch(
        &self,
        new_version: &str,
        source_version: &str,
    ) -> Result<NewBranch, AppError> {
        let remote = self.remote();
        let new_version = new_version.to_string();
        let source_version = source_version.to_string();

        let created = self
            .repo
            .run(move |repo| {
                branches::create_branch(repo, &remote, &new_version, &source_version)
            })
            .await
            .map_err(AppError::into_internal)?;

        let push = self.pushes.schedule(&created.new_branch);
        Ok(NewBranch {
            new_branch: created.new_branch,
            source_branch: created.source_branch,
            push,
        })
    }

    pub async fn branches(&self) -> Result<Vec<String>, AppError> {
        self.repo.run(branches::list_branches).await
    }

    pub async fn commits(&self, version: &str) -> Result<Vec<CommitInfo>, AppError> {
        let remote = self.remote();
        let version = version.to_string();
        self.repo
            .run(move |repo| {
                let branch = branch::validate_branch_name(repo, &remote, &version)?;
                branches::branch_commits(repo, &remote, &branch)
            })
            .await
    }

    pub async fn compare(
        &self,
        old_version: &str,
        new_version: &str,
    ) -> Result<Vec<FileChange>, AppError> {
        let remote = self.remote();
        let old_version = old_version.to_string();
        let new_version = new_version.to_string();
        self.repo
            .run(move |repo| {
                let old_branch = branch::validate_branch_name(repo, &remote, &old_version)?;
                let new_branch = branch::validate_branch_name(repo, &remote, &new_version)?;
                branches::compare_branches(repo, &remote, &old_branch, &new_branch)
            })
            .await
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Arc;

    use super::{SharedRepo, Workspace};
    use crate::git::GitRepo;
    use crate::push::outbox::testing::RecordingPusher;
    use crate::push::PushOutbox;

    /// A workspace over `repo` whose pushes are recorded, not sent
    pub fn recording_workspace(repo: GitRepo) -> (Workspace, Arc<RecordingPusher>) {
        let pusher = Arc::new(RecordingPusher::default());
        let outbox = PushOutbox::spawn("origin", pusher.clone());
        (Workspace::new(SharedRepo::new(repo), outbox), pusher)
    }
}
