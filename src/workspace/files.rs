use std::fs;
use std::path::Path;

use chrono::Local;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::git::GitRepo;
use crate::workspace::branches::ensure_local_branch;
use crate::workspace::content::{to_json_with_indent, FileContent};
use crate::workspace::template::seed_record;

pub const EDIT_COMMIT_MESSAGE: &str = "Updated file content";

fn write_creating_parents(path: &Path, contents: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn not_found_in_branch(branch: &str, file_path: &str) -> AppError {
    AppError::NotFoundInBranch {
        branch: branch.to_string(),
        path: file_path.to_string(),
    }
}

/// Commit `content` as `file_path` onto `branch`, then write it to the working tree.
///
/// The branch does not need to be checked out. Nothing on disk changes unless
/// the commit succeeds. Returns the new commit hash.
pub fn write_and_commit(
    repo: &GitRepo,
    branch: &str,
    file_path: &str,
    content: &FileContent,
) -> Result<String, AppError> {
    if let Err(e) = repo.branch_tip(branch) {
        warn!(branch, error = %format!("{e:#}"), "branch tip not found");
        return Err(not_found_in_branch(branch, file_path));
    }

    let rendered = content.render()?;
    let commit = repo
        .commit_file_on_branch(branch, file_path, rendered.as_bytes(), EDIT_COMMIT_MESSAGE)
        .map_err(|e| {
            warn!(branch, file_path, error = %format!("{e:#}"), "commit failed");
            not_found_in_branch(branch, file_path)
        })?;

    write_creating_parents(&repo.path().join(file_path), &rendered)?;

    // Keep `git status` clean when the edited branch is the one checked out
    if repo.get_current_branch().ok().as_deref() == Some(branch) {
        repo.add(&[file_path]).map_err(AppError::git)?;
    }

    info!(branch, file_path, %commit, "committed file content");
    Ok(commit)
}

/// The JSON stored at `file_path` on `branch` (or its remote-tracking copy)
pub fn read_json(
    repo: &GitRepo,
    remote_name: &str,
    branch: &str,
    file_path: &str,
) -> Result<Value, AppError> {
    let tip = repo
        .branch_or_remote_tip(remote_name, branch)
        .map_err(|_| not_found_in_branch(branch, file_path))?;

    let bytes = repo
        .read_file_at(&tip, file_path)
        .map_err(AppError::git)?
        .ok_or_else(|| not_found_in_branch(branch, file_path))?;

    serde_json::from_slice(&bytes).map_err(|e| {
        AppError::internal(format!("File '{file_path}' does not contain valid JSON: {e}"))
    })
}

/// Seed `<folder>/<file_name>` with a blank record on `branch` and commit it.
///
/// Leaves `branch` checked out. Returns the repository-relative path.
pub fn create_seeded_file(
    repo: &GitRepo,
    remote_name: &str,
    branch: &str,
    folder: &str,
    file_name: &str,
) -> Result<String, AppError> {
    let file_path = format!("{folder}/{file_name}");

    ensure_local_branch(repo, remote_name, branch)?;
    repo.checkout_branch(branch).map_err(AppError::git)?;

    let record = seed_record(folder, Local::now().naive_local());
    let rendered = to_json_with_indent(&record, b"  ")?;
    write_creating_parents(&repo.path().join(&file_path), &rendered)?;

    repo.add(&[file_path.as_str()]).map_err(AppError::git)?;
    let commit = repo
        .commit(&format!("Created new file {file_path}"))
        .map_err(AppError::git)?;

    info!(branch, %file_path, %commit, "created file");
    Ok(file_path)
}
